use chrono::Utc;

/// Image source for the character's avatar.
///
/// The URL only changes when the active status id changes; a changed URL
/// carries a `?v=` version so the browser fetches the new variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvatarSource {
    base: String,
    fallback: String,
    status_id: Option<i64>,
    src: String,
}

impl AvatarSource {
    pub fn new(base: &str, fallback: &str, status_id: Option<i64>) -> Self {
        let base = base.trim_end_matches('/').to_string();
        let src = format!("{}/{}", base, segment(status_id));
        Self {
            base,
            fallback: fallback.to_string(),
            status_id,
            src,
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn status_id(&self) -> Option<i64> {
        self.status_id
    }

    /// Recompute the source for `status_id`, tagging it with `version`.
    /// Returns false (and keeps the current source) if the id is unchanged.
    pub fn update(&mut self, status_id: Option<i64>, version: i64) -> bool {
        if status_id == self.status_id {
            return false;
        }
        self.status_id = status_id;
        self.src = format!("{}/{}?v={}", self.base, segment(status_id), version);
        true
    }

    /// [`update`](Self::update) with the current time as version.
    pub fn update_now(&mut self, status_id: Option<i64>) -> bool {
        self.update(status_id, Utc::now().timestamp_millis())
    }

    /// The image failed to load: show the fallback instead.
    pub fn failed(&mut self) -> bool {
        if self.src == self.fallback {
            return false;
        }
        self.src = self.fallback.clone();
        true
    }
}

/// No active status requests the default variant, id 0.
fn segment(status_id: Option<i64>) -> String {
    status_id.unwrap_or(0).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_source_has_no_version() {
        let avatar = AvatarSource::new("/api/sheet/player/avatar/", "/avatar404.png", Some(3));
        assert_eq!(avatar.src(), "/api/sheet/player/avatar/3");

        let avatar = AvatarSource::new("/api/sheet/player/avatar", "/avatar404.png", None);
        assert_eq!(avatar.src(), "/api/sheet/player/avatar/0");
    }

    #[test]
    fn test_update_only_when_status_changes() {
        let mut avatar = AvatarSource::new("/avatar", "/avatar404.png", Some(1));

        assert!(!avatar.update(Some(1), 1700000000000));
        assert_eq!(avatar.src(), "/avatar/1");

        assert!(avatar.update(Some(2), 1700000000000));
        assert_eq!(avatar.src(), "/avatar/2?v=1700000000000");
        assert_eq!(avatar.status_id(), Some(2));

        assert!(avatar.update_now(None));
        assert!(avatar.src().starts_with("/avatar/0?v="));
    }

    #[test]
    fn test_failure_switches_to_fallback_once() {
        let mut avatar = AvatarSource::new("/avatar", "/avatar404.png", Some(1));
        assert!(avatar.failed());
        assert_eq!(avatar.src(), "/avatar404.png");
        assert!(!avatar.failed());

        // A later status change retries the real image
        assert!(avatar.update(Some(4), 10));
        assert_eq!(avatar.src(), "/avatar/4?v=10");
    }
}
