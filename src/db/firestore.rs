// SPDX-License-Identifier: MIT
// Copyright 2026 Koodai Delivery <dev@koodai.app>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Partner profiles (the `delivery` collection)
//! - Orders (history queries and live listeners for daily stats)
//!
//! Besides the real client (and its emulator variant), the wrapper
//! carries an in-memory backend so integration tests can exercise
//! success paths without an emulator, and an offline mode where every
//! operation fails.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use firestore::{
    FirestoreListenEvent, FirestoreListener, FirestoreListenerTarget, FirestoreQueryDirection,
    FirestoreTempFilesListenStateStorage,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Order, PartnerProfile};

/// Listener target id for the per-partner orders query.
const ORDERS_TARGET: u32 = 17;

enum Backend {
    Firestore(firestore::FirestoreDb),
    Memory(MemoryBackend),
    Offline,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    backend: std::sync::Arc<Backend>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            backend: std::sync::Arc::new(Backend::Firestore(client)),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            backend: std::sync::Arc::new(Backend::Firestore(client)),
        })
    }

    /// Create a mock client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self {
            backend: std::sync::Arc::new(Backend::Offline),
        }
    }

    /// Create an in-memory client for testing.
    pub fn new_memory() -> Self {
        Self {
            backend: std::sync::Arc::new(Backend::Memory(MemoryBackend::default())),
        }
    }

    /// Helper to get the client or return an error if not connected.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        match &*self.backend {
            Backend::Firestore(client) => Ok(client),
            Backend::Memory(_) => Err(AppError::Database(
                "Operation requires the Firestore backend".to_string(),
            )),
            Backend::Offline => Err(AppError::Database(
                "Database not connected (offline mode)".to_string(),
            )),
        }
    }

    // ─── Generic Document Operations ─────────────────────────────

    /// Create a document under a freshly minted ID and return that ID.
    async fn create_document<T>(&self, collection: &'static str, data: &T) -> Result<String, AppError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let doc_id = uuid::Uuid::new_v4().to_string();

        match &*self.backend {
            Backend::Firestore(client) => {
                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collection)
                    .document_id(&doc_id)
                    .object(data)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
            Backend::Memory(mem) => {
                mem.upsert(collection, &doc_id, serde_json::to_value(data).map_err(to_db_err)?);
            }
            Backend::Offline => {
                return Err(AppError::Database(
                    "Database not connected (offline mode)".to_string(),
                ))
            }
        }

        Ok(doc_id)
    }

    /// Fetch one document by ID, or None if absent.
    async fn get_document<T>(
        &self,
        collection: &'static str,
        doc_id: &str,
    ) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        match &*self.backend {
            Backend::Firestore(client) => client
                .fluent()
                .select()
                .by_id_in(collection)
                .obj()
                .one(doc_id)
                .await
                .map_err(|e| AppError::Database(e.to_string())),
            Backend::Memory(mem) => mem.get(collection, doc_id),
            Backend::Offline => Err(AppError::Database(
                "Database not connected (offline mode)".to_string(),
            )),
        }
    }

    /// Query documents where `field` equals `value`, newest first when
    /// `order_desc_by` is given.
    async fn query_by_field<T>(
        &self,
        collection: &'static str,
        field: &'static str,
        value: &str,
        order_desc_by: Option<&'static str>,
    ) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        match &*self.backend {
            Backend::Firestore(client) => {
                let value = value.to_string();
                let query = client
                    .fluent()
                    .select()
                    .from(collection)
                    .filter(move |q| q.for_all([q.field(field).eq(value.clone())]));

                let query = if let Some(order_field) = order_desc_by {
                    query.order_by([(order_field, FirestoreQueryDirection::Descending)])
                } else {
                    query
                };

                query
                    .obj()
                    .query()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))
            }
            Backend::Memory(mem) => mem.query_eq(collection, field, value, order_desc_by),
            Backend::Offline => Err(AppError::Database(
                "Database not connected (offline mode)".to_string(),
            )),
        }
    }

    // ─── Partner Operations ──────────────────────────────────────

    /// Store a submitted partner application; returns the new document ID.
    pub async fn create_partner(&self, profile: &PartnerProfile) -> Result<String, AppError> {
        self.create_document(collections::DELIVERY, profile).await
    }

    /// Get a partner profile by document ID.
    pub async fn get_partner(&self, partner_id: &str) -> Result<Option<PartnerProfile>, AppError> {
        let profile: Option<PartnerProfile> = self
            .get_document(collections::DELIVERY, partner_id)
            .await?;
        Ok(profile.map(|mut p| {
            p.id.get_or_insert_with(|| partner_id.to_string());
            p
        }))
    }

    /// Resolve a phone number to a partner record, if one exists.
    pub async fn find_partner_by_phone(
        &self,
        phone: &str,
    ) -> Result<Option<PartnerProfile>, AppError> {
        let matches: Vec<PartnerProfile> = self
            .query_by_field(collections::DELIVERY, "identity.phone", phone, None)
            .await?;
        Ok(matches.into_iter().next())
    }

    // ─── Order Operations ────────────────────────────────────────

    /// Store an order record; returns the new document ID.
    pub async fn create_order(&self, order: &Order) -> Result<String, AppError> {
        self.create_document(collections::ORDERS, order).await
    }

    /// List a partner's orders, newest first.
    pub async fn orders_for_partner(&self, partner_id: &str) -> Result<Vec<Order>, AppError> {
        self.query_by_field(collections::ORDERS, "partner_id", partner_id, Some("created_at"))
            .await
    }

    /// Start a live listener over a partner's orders.
    ///
    /// Every matching document change re-invokes the channel with an
    /// upsert/remove event; the initial snapshot arrives as a sequence
    /// of upserts. Requires the real Firestore backend.
    pub async fn listen_partner_orders(
        &self,
        partner_id: &str,
        tx: mpsc::UnboundedSender<OrderChange>,
    ) -> Result<OrdersListener, AppError> {
        let client = self.get_client()?;

        let mut listener = client
            .create_listener(FirestoreTempFilesListenStateStorage::new())
            .await
            .map_err(|e| AppError::Database(format!("Failed to create listener: {}", e)))?;

        let partner_id = partner_id.to_string();
        client
            .fluent()
            .select()
            .from(collections::ORDERS)
            .filter(move |q| q.for_all([q.field("partner_id").eq(partner_id.clone())]))
            .listen()
            .add_target(FirestoreListenerTarget::new(ORDERS_TARGET), &mut listener)
            .map_err(|e| AppError::Database(format!("Failed to add listen target: {}", e)))?;

        listener
            .start(move |event| {
                let tx = tx.clone();
                async move {
                    match event {
                        FirestoreListenEvent::DocumentChange(ref change) => {
                            if let Some(doc) = &change.document {
                                match firestore::FirestoreDb::deserialize_doc_to::<Order>(doc) {
                                    Ok(order) => {
                                        let _ = tx.send(OrderChange::Upsert(
                                            doc_id_from_name(&doc.name),
                                            order,
                                        ));
                                    }
                                    Err(e) => {
                                        tracing::warn!(error = %e, "Skipping undecodable order document");
                                    }
                                }
                            }
                        }
                        FirestoreListenEvent::DocumentDelete(ref delete) => {
                            let _ = tx.send(OrderChange::Remove(doc_id_from_name(
                                &delete.document,
                            )));
                        }
                        _ => {}
                    }
                    Ok(())
                }
            })
            .await
            .map_err(|e| AppError::Database(format!("Failed to start listener: {}", e)))?;

        Ok(OrdersListener { inner: listener })
    }
}

/// A change delivered by the orders listener.
#[derive(Debug)]
pub enum OrderChange {
    Upsert(String, Order),
    Remove(String),
}

/// Handle owning a running orders listener; shut down when dropped from use.
pub struct OrdersListener {
    inner: FirestoreListener<firestore::FirestoreDb, FirestoreTempFilesListenStateStorage>,
}

impl OrdersListener {
    pub async fn shutdown(mut self) {
        if let Err(e) = self.inner.shutdown().await {
            tracing::warn!(error = %e, "Orders listener shutdown failed");
        }
    }
}

/// Extract the document id from a full Firestore resource name.
fn doc_id_from_name(name: &str) -> String {
    name.rsplit('/').next().unwrap_or(name).to_string()
}

fn to_db_err(e: serde_json::Error) -> AppError {
    AppError::Database(e.to_string())
}

// ─── In-Memory Backend (tests) ──────────────────────────────────

#[derive(Default)]
struct MemoryBackend {
    collections: Mutex<HashMap<&'static str, BTreeMap<String, serde_json::Value>>>,
}

impl MemoryBackend {
    fn upsert(&self, collection: &'static str, doc_id: &str, value: serde_json::Value) {
        let mut cols = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        cols.entry(collection)
            .or_default()
            .insert(doc_id.to_string(), value);
    }

    fn get<T: DeserializeOwned>(
        &self,
        collection: &'static str,
        doc_id: &str,
    ) -> Result<Option<T>, AppError> {
        let cols = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        let Some(value) = cols.get(collection).and_then(|c| c.get(doc_id)) else {
            return Ok(None);
        };
        let value = with_id(value.clone(), doc_id);
        serde_json::from_value(value).map(Some).map_err(to_db_err)
    }

    fn query_eq<T: DeserializeOwned>(
        &self,
        collection: &'static str,
        field: &'static str,
        value: &str,
        order_desc_by: Option<&'static str>,
    ) -> Result<Vec<T>, AppError> {
        let cols = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        let mut hits: Vec<(String, serde_json::Value)> = cols
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, doc)| {
                        lookup_path(doc, field).and_then(|v| v.as_str()) == Some(value)
                    })
                    .map(|(id, doc)| (id.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order_field) = order_desc_by {
            hits.sort_by(|(_, a), (_, b)| {
                let a_key = lookup_path(a, order_field).and_then(|v| v.as_str()).unwrap_or("");
                let b_key = lookup_path(b, order_field).and_then(|v| v.as_str()).unwrap_or("");
                b_key.cmp(a_key)
            });
        }

        hits.into_iter()
            .map(|(id, doc)| serde_json::from_value(with_id(doc, &id)).map_err(to_db_err))
            .collect()
    }
}

/// Inject the document id so models with an id field see it on reads.
fn with_id(mut value: serde_json::Value, doc_id: &str) -> serde_json::Value {
    if let Some(map) = value.as_object_mut() {
        map.insert("id".to_string(), serde_json::Value::String(doc_id.to_string()));
    }
    value
}

/// Resolve a dotted field path against a JSON document.
fn lookup_path<'a>(doc: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    path.split('.').try_fold(doc, |value, part| value.get(part))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrderStatus, PartnerStatus};

    fn test_profile(phone: &str) -> PartnerProfile {
        PartnerProfile {
            id: None,
            identity: crate::models::Identity {
                profile_photo: "data:image/jpeg;base64,aGk=".to_string(),
                name: "Arun Kumar".to_string(),
                house_no: "12A".to_string(),
                street: "2nd Cross Street".to_string(),
                area: "Anna Nagar".to_string(),
                landmark: "".to_string(),
                city: "Chennai".to_string(),
                state: "Tamil Nadu".to_string(),
                pincode: "600040".to_string(),
                emergency: None,
                phone: phone.to_string(),
                email: None,
            },
            permissions: crate::models::Permissions {
                camera: true,
                notifications: true,
                location: true,
            },
            kyc: crate::models::KycDocuments {
                national_id: "data:image/jpeg;base64,aWQ=".to_string(),
                tax_id: "data:image/jpeg;base64,dGF4".to_string(),
                license: "data:image/jpeg;base64,ZGw=".to_string(),
            },
            vehicle: crate::models::Vehicle {
                vehicle_type: crate::models::VehicleType::Bike,
                plate: "TN 01 AB 1234".to_string(),
                model: "Splendor Plus".to_string(),
                license: "TN-01-2020-1234567".to_string(),
                insurance_image: None,
            },
            payment: crate::models::Payment {
                bank_name: "State Bank".to_string(),
                holder_name: "Arun Kumar".to_string(),
                account_no: "123456789012".to_string(),
                ifsc: "SBIN0001234".to_string(),
                upi: None,
            },
            status: PartnerStatus::PendingVerification,
            created_at: "2026-08-07T10:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_memory_backend_round_trip_and_phone_query() {
        let db = FirestoreDb::new_memory();

        let id = db.create_partner(&test_profile("9876543210")).await.unwrap();

        let fetched = db.get_partner(&id).await.unwrap().unwrap();
        assert_eq!(fetched.id.as_deref(), Some(id.as_str()));
        assert_eq!(fetched.identity.phone, "9876543210");

        // Nested field path query
        let by_phone = db.find_partner_by_phone("9876543210").await.unwrap();
        assert!(by_phone.is_some());
        assert!(db.find_partner_by_phone("9123456780").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_backend_orders_newest_first() {
        let db = FirestoreDb::new_memory();

        for (amount, created_at) in [
            (85.0, "2026-08-07T09:00:00Z"),
            (120.0, "2026-08-07T11:00:00Z"),
            (65.0, "2026-08-06T10:00:00Z"),
        ] {
            db.create_order(&Order {
                id: None,
                partner_id: "partner-1".to_string(),
                total_amount: amount,
                status: OrderStatus::Completed,
                created_at: created_at.parse().unwrap(),
                restaurant_name: "Hotel Saravana Bhavan".to_string(),
                pickup: "Anna Nagar".to_string(),
                drop_location: "Green Park Apts".to_string(),
            })
            .await
            .unwrap();
        }

        let orders = db.orders_for_partner("partner-1").await.unwrap();
        assert_eq!(orders.len(), 3);
        assert_eq!(orders[0].total_amount, 120.0);
        assert_eq!(orders[2].total_amount, 65.0);

        assert!(db.orders_for_partner("partner-2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_offline_mode_errors() {
        let db = FirestoreDb::new_mock();
        assert!(db.get_partner("anything").await.is_err());
        assert!(db.create_partner(&test_profile("9876543210")).await.is_err());
    }
}
