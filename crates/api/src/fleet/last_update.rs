use chrono::Utc;
use entity::last_update;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, ConnectionTrait, EntityTrait};

use crate::error::FleetResult;

/// Stamps the singleton row with the current time, creating it on first use.
///
/// Callers run this inside the same transaction as the write it records.
pub async fn touch<C>(conn: &C) -> FleetResult<DateTimeWithTimeZone>
where
    C: ConnectionTrait,
{
    let now: DateTimeWithTimeZone = Utc::now().into();
    let row = last_update::ActiveModel {
        id: Set(last_update::SINGLETON_ID),
        updated_at: Set(now),
    };
    last_update::Entity::insert(row)
        .on_conflict(
            OnConflict::column(last_update::Column::Id)
                .update_column(last_update::Column::UpdatedAt)
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(now)
}

pub async fn current<C>(conn: &C) -> FleetResult<Option<DateTimeWithTimeZone>>
where
    C: ConnectionTrait,
{
    let row = last_update::Entity::find_by_id(last_update::SINGLETON_ID)
        .one(conn)
        .await?;
    Ok(row.map(|row| row.updated_at))
}
