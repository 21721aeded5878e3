use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The `[published, expires)` range a version is publicly visible in.
/// No `published` means never public.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationWindow {
    pub published: Option<DateTime<Utc>>,
    pub expires: Option<DateTime<Utc>>,
}

impl PublicationWindow {
    pub fn new(published: Option<DateTime<Utc>>, expires: Option<DateTime<Utc>>) -> Self {
        Self { published, expires }
    }

    pub fn is_open_at(&self, at: DateTime<Utc>) -> bool {
        self.published.is_some_and(|published| published <= at)
            && self.expires.is_none_or(|expires| expires > at)
    }

    /// Expiry at or before publication can never open.
    pub fn is_well_formed(&self) -> bool {
        match (self.published, self.expires) {
            (Some(published), Some(expires)) => expires > published,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn unpublished_is_never_open() {
        let window = PublicationWindow::new(None, None);
        assert!(!window.is_open_at(at(12)));
    }

    #[test]
    fn opens_at_published_and_closes_at_expires() {
        let window = PublicationWindow::new(Some(at(10)), Some(at(14)));
        assert!(!window.is_open_at(at(10) - Duration::seconds(1)));
        assert!(window.is_open_at(at(10)));
        assert!(window.is_open_at(at(13)));
        assert!(!window.is_open_at(at(14)));
    }

    #[test]
    fn open_ended_window_stays_open() {
        let window = PublicationWindow::new(Some(at(10)), None);
        assert!(window.is_open_at(at(23)));
    }

    #[test]
    fn expiry_before_publication_is_malformed() {
        assert!(!PublicationWindow::new(Some(at(10)), Some(at(9))).is_well_formed());
        assert!(PublicationWindow::new(None, Some(at(9))).is_well_formed());
    }
}
