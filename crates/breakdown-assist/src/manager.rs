//! Record construction and lifecycle transitions.
//!
//! [`RecordManager`] is the single write path to the tabular store: it
//! validates and constructs new breakdown records, applies status and
//! assignment transitions to stored ones, and keeps the snapshot cache
//! invalidated after every write. Reads go through the cache.

use chrono::{DateTime, FixedOffset, Timelike, Utc};
use tracing::{info, warn};

use crate::cache::SnapshotCache;
use crate::error::{Error, Result};
use crate::geo;
use crate::record::{derive_id, BreakdownRecord, Priority, Status, VehicleType};
use crate::store::TabularStore;

/// Default fixed UTC offset for all timestamps: +05:30.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;

/// The default fixed time zone used when none is configured.
///
/// # Panics
///
/// Never panics: the default offset is a valid fixed offset.
#[must_use]
pub fn default_timezone() -> FixedOffset {
    FixedOffset::east_opt(DEFAULT_UTC_OFFSET_MINUTES * 60).expect("valid default offset")
}

/// The acting user, passed explicitly into every operation.
#[derive(Debug, Clone)]
pub struct Session {
    /// Name recorded as `added_by` / fallback `resolved_by`.
    pub actor: String,
}

impl Session {
    /// Create a session for the named actor.
    #[must_use]
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
        }
    }
}

/// Behavior knobs for operations whose source behavior was inconsistent.
#[derive(Debug, Clone, Copy, Default)]
pub struct Policy {
    /// When true, entering Resolved without any resolver name is a hard
    /// error; when false (the source behavior) it is logged and allowed.
    pub enforce_resolver_required: bool,
}

/// Raw form fields for a new breakdown record.
///
/// Coordinates arrive as free text exactly as typed; they are parsed as
/// decimals during construction and fall back to the map link when absent or
/// unparsable.
#[derive(Debug, Clone, Default)]
pub struct NewBreakdown {
    /// Rental booking identifier (required).
    pub booking_id: String,
    /// Customer name.
    pub customer_name: String,
    /// Customer mobile number (required).
    pub customer_mobile: String,
    /// Where the vehicle was picked up.
    pub pickup_location: String,
    /// Booking duration in days.
    pub booking_days: Option<u32>,
    /// Issue description (required).
    pub issue: String,
    /// Vehicle registration number.
    pub vehicle_number: String,
    /// Vehicle model name.
    pub vehicle_model: String,
    /// Kind of vehicle (required).
    pub vehicle_type: Option<VehicleType>,
    /// Free-text map link.
    pub customer_location_url: String,
    /// Explicit latitude as typed, possibly empty.
    pub latitude: String,
    /// Explicit longitude as typed, possibly empty.
    pub longitude: String,
    /// Initial urgency.
    pub priority: Priority,
    /// Initial status; Resolved here stamps the resolver immediately.
    pub status: Status,
    /// Follow-up owner name.
    pub followup_by: String,
}

/// A requested status/priority/follow-up change for a stored record.
#[derive(Debug, Clone, Default)]
pub struct Transition {
    /// Target status.
    pub status: Status,
    /// Target priority.
    pub priority: Priority,
    /// New follow-up owner name.
    pub followup_by: String,
    /// Resolver name; falls back to the session actor, then to the stored
    /// value, when entering Resolved.
    pub resolved_by: String,
}

/// The breakdown record manager.
///
/// Owns the store, the snapshot cache, the policy knobs, and the fixed time
/// zone. All operations run to completion; there is no retry and no
/// concurrent-write coordination (last writer wins).
#[derive(Debug)]
pub struct RecordManager<S: TabularStore> {
    store: S,
    cache: SnapshotCache,
    policy: Policy,
    timezone: FixedOffset,
}

impl<S: TabularStore> RecordManager<S> {
    /// Create a manager with the default cache, policy, and time zone.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_settings(store, SnapshotCache::new(), Policy::default(), default_timezone())
    }

    /// Create a manager with explicit collaborators.
    #[must_use]
    pub fn with_settings(
        store: S,
        cache: SnapshotCache,
        policy: Policy,
        timezone: FixedOffset,
    ) -> Self {
        Self {
            store,
            cache,
            policy,
            timezone,
        }
    }

    /// Current time in the fixed zone, truncated to whole seconds (the
    /// storage format has second precision).
    fn now(&self) -> DateTime<FixedOffset> {
        let now = Utc::now().with_timezone(&self.timezone);
        now.with_nanosecond(0).unwrap_or(now)
    }

    /// Validate raw form fields and append one new record to the store.
    ///
    /// Required fields are `booking_id`, `customer_mobile`, `issue`, and
    /// `vehicle_type`; if any is missing nothing is written. Explicit
    /// coordinates win over the map link; a record created directly as
    /// Resolved is stamped with the session actor and the current time.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming every missing required field, or a
    /// store error if the append fails.
    pub fn create(&mut self, session: &Session, form: &NewBreakdown) -> Result<BreakdownRecord> {
        let mut missing = Vec::new();
        if form.booking_id.trim().is_empty() {
            missing.push("booking_id".to_string());
        }
        if form.customer_mobile.trim().is_empty() {
            missing.push("customer_mobile".to_string());
        }
        if form.issue.trim().is_empty() {
            missing.push("issue".to_string());
        }
        if form.vehicle_type.is_none() {
            missing.push("vehicle_type".to_string());
        }
        if !missing.is_empty() {
            return Err(Error::missing_fields(missing));
        }

        let (latitude, longitude) = resolve_coordinates(
            &form.latitude,
            &form.longitude,
            &form.customer_location_url,
        );

        let now = self.now();
        let booking_id = form.booking_id.trim().to_string();
        let resolved_at_creation = form.status == Status::Resolved;
        let record = BreakdownRecord {
            id: derive_id(&booking_id),
            created_at: Some(now),
            last_updated: Some(now),
            booking_id,
            customer_name: form.customer_name.trim().to_string(),
            customer_mobile: form.customer_mobile.trim().to_string(),
            pickup_location: form.pickup_location.trim().to_string(),
            booking_days: form.booking_days,
            issue: form.issue.trim().to_string(),
            vehicle_number: form.vehicle_number.trim().to_string(),
            vehicle_model: form.vehicle_model.trim().to_string(),
            vehicle_type: form.vehicle_type.unwrap_or_default(),
            customer_location_url: form.customer_location_url.trim().to_string(),
            latitude,
            longitude,
            priority: form.priority,
            status: form.status,
            followup_by: form.followup_by.trim().to_string(),
            added_by: session.actor.trim().to_string(),
            resolved_by: if resolved_at_creation {
                session.actor.trim().to_string()
            } else {
                String::new()
            },
            resolved_at: resolved_at_creation.then_some(now),
        };

        self.store.append_row(&record.to_row())?;
        self.cache.invalidate();
        info!("added breakdown {} for booking {}", record.id, record.booking_id);
        Ok(record)
    }

    /// Apply a status/priority/follow-up transition to a stored record.
    ///
    /// The target row is located by identifier against a fresh store read at
    /// call time, never a cached position, and is overwritten in place.
    /// Entering Resolved stamps the resolver (supplied name, else session
    /// actor, else the stored value) and sets the resolution time only if not
    /// already present; leaving Resolved clears both unconditionally.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordNotFound`] for an unknown identifier,
    /// [`Error::ResolverRequired`] when the policy demands a resolver and
    /// none can be found, or a store error if the read or overwrite fails.
    pub fn transition(
        &mut self,
        session: &Session,
        id: &str,
        change: &Transition,
    ) -> Result<BreakdownRecord> {
        let target = id.trim();
        let rows = self.store.read_all()?;
        let index = rows
            .iter()
            .position(|row| row.first().is_some_and(|cell| cell.trim() == target))
            .ok_or_else(|| Error::RecordNotFound(target.to_string()))?;

        let mut record = BreakdownRecord::from_row(&rows[index]);
        let now = self.now();

        record.status = change.status;
        record.priority = change.priority;
        record.followup_by = change.followup_by.trim().to_string();
        record.last_updated = Some(now);

        if change.status == Status::Resolved {
            let mut resolver = change.resolved_by.trim().to_string();
            if resolver.is_empty() {
                resolver = session.actor.trim().to_string();
            }
            if resolver.is_empty() {
                resolver.clone_from(&record.resolved_by);
            }
            if resolver.is_empty() {
                if self.policy.enforce_resolver_required {
                    return Err(Error::ResolverRequired {
                        id: record.id.clone(),
                    });
                }
                warn!("marking {} Resolved without a resolver name", record.id);
            }
            record.resolved_by = resolver;
            if record.resolved_at.is_none() {
                record.resolved_at = Some(now);
            }
        } else {
            record.resolved_by.clear();
            record.resolved_at = None;
        }

        self.store.update_row(index, &record.to_row())?;
        self.cache.invalidate();
        info!("updated breakdown {} to {}", record.id, record.status);
        Ok(record)
    }

    /// Read all records through the snapshot cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot is stale and the store read fails.
    pub fn records(&mut self) -> Result<Vec<BreakdownRecord>> {
        self.cache.records(&self.store)
    }

    /// Look up one record by identifier, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    pub fn find(&mut self, id: &str) -> Result<Option<BreakdownRecord>> {
        let target = id.trim();
        Ok(self
            .records()?
            .into_iter()
            .find(|record| record.id.trim().eq_ignore_ascii_case(target)))
    }

    /// Drop the cached snapshot so the next read hits the store.
    pub fn refresh(&mut self) {
        self.cache.invalidate();
    }

    /// The fixed time zone every timestamp is recorded in.
    #[must_use]
    pub fn timezone(&self) -> FixedOffset {
        self.timezone
    }
}

/// Resolve the record coordinates from explicit form fields and the map link.
///
/// Explicit values parsed as decimals take precedence per component; an
/// absent or unparsable component falls back to the first matching link
/// pattern; failing both, the component stays empty.
fn resolve_coordinates(
    latitude: &str,
    longitude: &str,
    location_url: &str,
) -> (Option<f64>, Option<f64>) {
    let explicit_lat: Option<f64> = latitude.trim().parse().ok();
    let explicit_lon: Option<f64> = longitude.trim().parse().ok();

    if explicit_lat.is_some() && explicit_lon.is_some() {
        return (explicit_lat, explicit_lon);
    }

    let extracted = geo::extract_coordinates(location_url.trim());
    (
        explicit_lat.or(extracted.map(|(lat, _)| lat)),
        explicit_lon.or(extracted.map(|(_, lon)| lon)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn manager() -> RecordManager<MemoryStore> {
        RecordManager::new(MemoryStore::new())
    }

    fn session() -> Session {
        Session::new("Asha")
    }

    fn valid_form() -> NewBreakdown {
        NewBreakdown {
            booking_id: "RNT998877".to_string(),
            customer_name: " Ravi Kumar ".to_string(),
            customer_mobile: "9876543210".to_string(),
            pickup_location: "Indiranagar".to_string(),
            booking_days: Some(2),
            issue: "Flat tyre on highway".to_string(),
            vehicle_number: "KA01AB1234".to_string(),
            vehicle_model: "Classic 350".to_string(),
            vehicle_type: Some(VehicleType::Bike),
            customer_location_url: String::new(),
            latitude: String::new(),
            longitude: String::new(),
            priority: Priority::Medium,
            status: Status::Open,
            followup_by: String::new(),
        }
    }

    #[test]
    fn test_create_appends_one_row() {
        let mut mgr = manager();
        let record = mgr.create(&session(), &valid_form()).unwrap();

        assert_eq!(record.id, "BD-98877");
        assert_eq!(record.customer_name, "Ravi Kumar");
        assert_eq!(record.added_by, "Asha");
        assert_eq!(record.status, Status::Open);
        assert!(record.created_at.is_some());
        assert!(record.last_updated.is_some());
        assert!(record.resolved_at.is_none());

        let records = mgr.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0], record);
    }

    #[test]
    fn test_create_rejects_missing_fields() {
        let mut mgr = manager();
        let form = NewBreakdown {
            booking_id: "  ".to_string(),
            ..NewBreakdown::default()
        };

        let err = mgr.create(&session(), &form).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("booking_id"));
        assert!(msg.contains("customer_mobile"));
        assert!(msg.contains("issue"));
        assert!(msg.contains("vehicle_type"));

        // Nothing was persisted.
        assert!(mgr.records().unwrap().is_empty());
    }

    #[test]
    fn test_create_explicit_coordinates_win() {
        let mut mgr = manager();
        let form = NewBreakdown {
            latitude: "1.25".to_string(),
            longitude: "2.5".to_string(),
            customer_location_url: "https://maps.google.com/@12.34,77.12,15z".to_string(),
            ..valid_form()
        };
        let record = mgr.create(&session(), &form).unwrap();
        assert_eq!(record.latitude, Some(1.25));
        assert_eq!(record.longitude, Some(2.5));
    }

    #[test]
    fn test_create_coordinates_from_url() {
        let mut mgr = manager();
        let form = NewBreakdown {
            customer_location_url: "https://maps.google.com/?q=10.0,20.5".to_string(),
            ..valid_form()
        };
        let record = mgr.create(&session(), &form).unwrap();
        assert_eq!(record.latitude, Some(10.0));
        assert_eq!(record.longitude, Some(20.5));
    }

    #[test]
    fn test_create_partial_explicit_falls_back_per_component() {
        let mut mgr = manager();
        let form = NewBreakdown {
            latitude: "1.25".to_string(),
            customer_location_url: "https://maps.google.com/@12.34,77.12,15z".to_string(),
            ..valid_form()
        };
        let record = mgr.create(&session(), &form).unwrap();
        assert_eq!(record.latitude, Some(1.25));
        assert_eq!(record.longitude, Some(77.12));
    }

    #[test]
    fn test_create_unparsable_coordinates_fall_back() {
        let mut mgr = manager();
        let form = NewBreakdown {
            latitude: "north-ish".to_string(),
            longitude: "far".to_string(),
            customer_location_url: "https://maps.google.com/@12.34,77.12,15z".to_string(),
            ..valid_form()
        };
        let record = mgr.create(&session(), &form).unwrap();
        assert_eq!(record.latitude, Some(12.34));
        assert_eq!(record.longitude, Some(77.12));
    }

    #[test]
    fn test_create_no_coordinates_stays_empty() {
        let mut mgr = manager();
        let form = NewBreakdown {
            customer_location_url: "https://example.com/no-coords".to_string(),
            ..valid_form()
        };
        let record = mgr.create(&session(), &form).unwrap();
        assert_eq!(record.latitude, None);
        assert_eq!(record.longitude, None);
    }

    #[test]
    fn test_create_resolved_stamps_resolver() {
        let mut mgr = manager();
        let form = NewBreakdown {
            status: Status::Resolved,
            ..valid_form()
        };
        let record = mgr.create(&session(), &form).unwrap();
        assert_eq!(record.resolved_by, "Asha");
        assert!(record.resolved_at.is_some());
    }

    #[test]
    fn test_transition_updates_fields() {
        let mut mgr = manager();
        mgr.create(&session(), &valid_form()).unwrap();

        let updated = mgr
            .transition(
                &session(),
                "BD-98877",
                &Transition {
                    status: Status::InProgress,
                    priority: Priority::High,
                    followup_by: " Ravi ".to_string(),
                    resolved_by: String::new(),
                },
            )
            .unwrap();

        assert_eq!(updated.status, Status::InProgress);
        assert_eq!(updated.priority, Priority::High);
        assert_eq!(updated.followup_by, "Ravi");
        assert!(updated.last_updated.is_some());

        let stored = mgr.find("BD-98877").unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[test]
    fn test_transition_unknown_id() {
        let mut mgr = manager();
        let err = mgr
            .transition(&session(), "BD-0000", &Transition::default())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_transition_targets_correct_row() {
        let mut mgr = manager();
        mgr.create(&session(), &valid_form()).unwrap();
        let form_b = NewBreakdown {
            booking_id: "RNT555555".to_string(),
            ..valid_form()
        };
        mgr.create(&session(), &form_b).unwrap();

        mgr.transition(
            &session(),
            "BD-55555",
            &Transition {
                status: Status::Cancelled,
                priority: Priority::Low,
                ..Transition::default()
            },
        )
        .unwrap();

        let records = mgr.records().unwrap();
        assert_eq!(records[0].status, Status::Open);
        assert_eq!(records[1].status, Status::Cancelled);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut mgr = manager();
        mgr.create(&session(), &valid_form()).unwrap();

        let resolve = Transition {
            status: Status::Resolved,
            resolved_by: "Maya".to_string(),
            ..Transition::default()
        };
        let first = mgr.transition(&session(), "BD-98877", &resolve).unwrap();
        let first_resolved_at = first.resolved_at.unwrap();

        let second = mgr.transition(&session(), "BD-98877", &resolve).unwrap();
        assert_eq!(second.resolved_at, Some(first_resolved_at));
    }

    #[test]
    fn test_unresolve_clears_resolution_fields() {
        let mut mgr = manager();
        mgr.create(&session(), &valid_form()).unwrap();

        mgr.transition(
            &session(),
            "BD-98877",
            &Transition {
                status: Status::Resolved,
                resolved_by: "Maya".to_string(),
                ..Transition::default()
            },
        )
        .unwrap();

        let reopened = mgr
            .transition(
                &session(),
                "BD-98877",
                &Transition {
                    status: Status::Cancelled,
                    ..Transition::default()
                },
            )
            .unwrap();

        assert_eq!(reopened.resolved_by, "");
        assert_eq!(reopened.resolved_at, None);
    }

    #[test]
    fn test_resolver_falls_back_to_session_actor() {
        let mut mgr = manager();
        mgr.create(&session(), &valid_form()).unwrap();

        let resolved = mgr
            .transition(
                &session(),
                "BD-98877",
                &Transition {
                    status: Status::Resolved,
                    ..Transition::default()
                },
            )
            .unwrap();
        assert_eq!(resolved.resolved_by, "Asha");
    }

    #[test]
    fn test_resolver_falls_back_to_stored_value() {
        let mut mgr = manager();
        mgr.create(&session(), &valid_form()).unwrap();

        mgr.transition(
            &session(),
            "BD-98877",
            &Transition {
                status: Status::Resolved,
                resolved_by: "Maya".to_string(),
                ..Transition::default()
            },
        )
        .unwrap();

        // Re-save with neither a supplied resolver nor an actor name.
        let resolved = mgr
            .transition(
                &Session::new(""),
                "BD-98877",
                &Transition {
                    status: Status::Resolved,
                    ..Transition::default()
                },
            )
            .unwrap();
        assert_eq!(resolved.resolved_by, "Maya");
    }

    #[test]
    fn test_policy_enforces_resolver() {
        let mut mgr = RecordManager::with_settings(
            MemoryStore::new(),
            SnapshotCache::new(),
            Policy {
                enforce_resolver_required: true,
            },
            default_timezone(),
        );
        mgr.create(&session(), &valid_form()).unwrap();

        let err = mgr
            .transition(
                &Session::new(""),
                "BD-98877",
                &Transition {
                    status: Status::Resolved,
                    ..Transition::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::ResolverRequired { .. }));

        // The rejected transition wrote nothing.
        assert_eq!(mgr.find("BD-98877").unwrap().unwrap().status, Status::Open);
    }

    #[test]
    fn test_policy_soft_allows_empty_resolver() {
        let mut mgr = manager();
        mgr.create(&session(), &valid_form()).unwrap();

        let resolved = mgr
            .transition(
                &Session::new(""),
                "BD-98877",
                &Transition {
                    status: Status::Resolved,
                    ..Transition::default()
                },
            )
            .unwrap();
        assert_eq!(resolved.resolved_by, "");
        assert!(resolved.resolved_at.is_some());
    }

    #[test]
    fn test_round_trip_after_invalidation() {
        let mut mgr = manager();
        let form = NewBreakdown {
            customer_location_url: "https://maps.google.com/@12.34,77.12,15z".to_string(),
            followup_by: "Ravi".to_string(),
            ..valid_form()
        };
        let created = mgr.create(&session(), &form).unwrap();

        let read_back = mgr.find("BD-98877").unwrap().unwrap();
        assert_eq!(read_back, created);
        // Machine timestamps survived serialization and are parseable.
        assert!(read_back.created_at.is_some());
        assert!(read_back.last_updated.is_some());
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let mut mgr = manager();
        mgr.create(&session(), &valid_form()).unwrap();

        assert!(mgr.find(" bd-98877 ").unwrap().is_some());
        assert!(mgr.find("BD-98877").unwrap().is_some());
        assert!(mgr.find("BD-00000").unwrap().is_none());
    }

    #[test]
    fn test_coerced_stored_status_offered_as_default() {
        // Seed a row with a corrupt status cell directly in the store.
        let mut store = MemoryStore::new();
        let mut row = vec![String::new(); 21];
        row[0] = "BD-XYZ99".to_string();
        row[16] = "Unknown".to_string();
        store.append_row(&row).unwrap();

        let mut mgr = RecordManager::new(store);
        let record = mgr.find("BD-XYZ99").unwrap().unwrap();
        assert_eq!(record.status, Status::Open);
        assert_eq!(record.priority, Priority::Medium);
    }

    #[test]
    fn test_refresh_drops_snapshot() {
        let mut mgr = manager();
        mgr.create(&session(), &valid_form()).unwrap();
        mgr.records().unwrap();
        mgr.refresh();
        // Still readable after an explicit refresh.
        assert_eq!(mgr.records().unwrap().len(), 1);
    }

    #[test]
    fn test_default_timezone_offset() {
        assert_eq!(default_timezone().local_minus_utc(), 330 * 60);
    }
}
