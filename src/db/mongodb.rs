use async_trait::async_trait;
use chrono::NaiveDate;
use futures::TryStreamExt;
use log::info;
use mongodb::{
    bson::{doc, Document},
    options::{ClientOptions, IndexOptions},
    Client, Collection, IndexModel,
};
use serde::de::DeserializeOwned;

use super::Store;
use crate::errors::StoreResult;
use crate::models::{Booking, BookingStatus, Bus, Role, User};

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db_name: String,
}

impl MongoDB {
    pub async fn new(uri: &str, db_name: &str) -> StoreResult<Self> {
        let client_options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(client_options)?;
        Ok(MongoDB {
            client,
            db_name: db_name.to_string(),
        })
    }

    fn get_users_collection(&self) -> Collection<User> {
        self.client.database(&self.db_name).collection("users")
    }

    fn get_buses_collection(&self) -> Collection<Bus> {
        self.client.database(&self.db_name).collection("buses")
    }

    fn get_bookings_collection(&self) -> Collection<Booking> {
        self.client.database(&self.db_name).collection("bookings")
    }

    /// Unique emails are enforced here; seat conflicts are only checked by
    /// the booking service before insert.
    pub async fn ensure_indexes(&self) -> StoreResult<()> {
        let unique_email = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.get_users_collection()
            .create_index(unique_email, None)
            .await?;

        let seat_lookup = IndexModel::builder()
            .keys(doc! { "bus_id": 1, "travel_date": 1, "status": 1 })
            .build();
        self.get_bookings_collection()
            .create_index(seat_lookup, None)
            .await?;

        let by_user = IndexModel::builder().keys(doc! { "user_id": 1 }).build();
        self.get_bookings_collection()
            .create_index(by_user, None)
            .await?;

        let by_driver = IndexModel::builder().keys(doc! { "driver_id": 1 }).build();
        self.get_buses_collection()
            .create_index(by_driver, None)
            .await?;

        info!("MongoDB indexes ensured on database {}", self.db_name);
        Ok(())
    }
}

async fn find_all<T>(collection: &Collection<T>, filter: Document) -> StoreResult<Vec<T>>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let cursor = collection.find(filter, None).await?;
    Ok(cursor.try_collect().await?)
}

#[async_trait]
impl Store for MongoDB {
    async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self
            .get_users_collection()
            .find_one(doc! { "_id": id }, None)
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .get_users_collection()
            .find_one(doc! { "email": email }, None)
            .await?)
    }

    async fn list_users(&self, role: Option<Role>) -> StoreResult<Vec<User>> {
        let filter = match role {
            Some(role) => doc! { "role": role.as_str() },
            None => doc! {},
        };
        let mut users = find_all(&self.get_users_collection(), filter).await?;
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        self.get_users_collection().insert_one(user, None).await?;
        Ok(())
    }

    async fn list_buses(&self) -> StoreResult<Vec<Bus>> {
        let mut buses = find_all(&self.get_buses_collection(), doc! {}).await?;
        buses.sort_by_key(|b| b.created_at);
        Ok(buses)
    }

    async fn find_bus(&self, id: &str) -> StoreResult<Option<Bus>> {
        Ok(self
            .get_buses_collection()
            .find_one(doc! { "_id": id }, None)
            .await?)
    }

    async fn list_buses_by_driver(&self, driver_id: &str) -> StoreResult<Vec<Bus>> {
        let mut buses = find_all(
            &self.get_buses_collection(),
            doc! { "driver_id": driver_id },
        )
        .await?;
        buses.sort_by_key(|b| b.created_at);
        Ok(buses)
    }

    async fn count_buses(&self) -> StoreResult<u64> {
        Ok(self
            .get_buses_collection()
            .count_documents(doc! {}, None)
            .await?)
    }

    async fn insert_bus(&self, bus: &Bus) -> StoreResult<()> {
        self.get_buses_collection().insert_one(bus, None).await?;
        Ok(())
    }

    async fn replace_bus(&self, bus: &Bus) -> StoreResult<bool> {
        let result = self
            .get_buses_collection()
            .replace_one(doc! { "_id": bus.id.as_str() }, bus, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn clear_buses(&self) -> StoreResult<u64> {
        let result = self
            .get_buses_collection()
            .delete_many(doc! {}, None)
            .await?;
        Ok(result.deleted_count)
    }

    async fn list_bookings_by_user(&self, user_id: &str) -> StoreResult<Vec<Booking>> {
        let mut bookings = find_all(
            &self.get_bookings_collection(),
            doc! { "user_id": user_id },
        )
        .await?;
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }

    async fn list_confirmed_bookings(
        &self,
        bus_id: &str,
        travel_date: NaiveDate,
    ) -> StoreResult<Vec<Booking>> {
        find_all(
            &self.get_bookings_collection(),
            doc! {
                "bus_id": bus_id,
                "travel_date": travel_date.to_string(),
                "status": BookingStatus::Confirmed.as_str(),
            },
        )
        .await
    }

    async fn list_confirmed_bookings_for_bus(&self, bus_id: &str) -> StoreResult<Vec<Booking>> {
        find_all(
            &self.get_bookings_collection(),
            doc! { "bus_id": bus_id, "status": BookingStatus::Confirmed.as_str() },
        )
        .await
    }

    async fn find_booking(&self, id: &str) -> StoreResult<Option<Booking>> {
        Ok(self
            .get_bookings_collection()
            .find_one(doc! { "_id": id }, None)
            .await?)
    }

    async fn insert_booking(&self, booking: &Booking) -> StoreResult<()> {
        self.get_bookings_collection()
            .insert_one(booking, None)
            .await?;
        Ok(())
    }

    async fn set_booking_status(&self, id: &str, status: BookingStatus) -> StoreResult<bool> {
        let result = self
            .get_bookings_collection()
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "status": status.as_str() } },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }
}
