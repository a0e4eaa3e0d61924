use chrono::Utc;
use model::location::{GeoPoint, LocationState};
use tokio::sync::watch;

/// Creates a connected pair: the provider side pushes updates into the
/// feed, sessions read the latest value through the sampler. Only the most
/// recent state is kept, older fixes are overwritten.
pub fn location_channel() -> (LocationFeed, LocationSampler) {
    let (sender, receiver) = watch::channel(LocationState {
        acquiring: true,
        ..Default::default()
    });
    (LocationFeed { sender }, LocationSampler { receiver })
}

#[derive(Debug)]
pub struct LocationFeed {
    sender: watch::Sender<LocationState>,
}

impl LocationFeed {
    pub fn sampler(&self) -> LocationSampler {
        LocationSampler {
            receiver: self.sender.subscribe(),
        }
    }

    /// Replaces the whole state, as reported by the provider.
    pub fn publish(&self, mut state: LocationState) {
        state.updated_at = Some(Utc::now());
        self.sender.send_replace(state);
    }

    pub fn push_fix(&self, fix: GeoPoint) {
        self.sender.send_modify(|state| {
            state.fix = Some(fix);
            state.acquiring = false;
            state.error = None;
            state.updated_at = Some(Utc::now());
        });
    }

    pub fn set_acquiring(&self, acquiring: bool) {
        self.sender.send_modify(|state| {
            state.acquiring = acquiring;
            state.updated_at = Some(Utc::now());
        });
    }

    /// Signal loss or a denied permission. The last fix is dropped, it can
    /// not be trusted anymore.
    pub fn report_error<S: Into<String>>(&self, error: S) {
        let error = error.into();
        log::warn!("location provider reported an error: {}", error);
        self.sender.send_modify(|state| {
            state.fix = None;
            state.acquiring = false;
            state.error = Some(error);
            state.updated_at = Some(Utc::now());
        });
    }
}

/// Read side of the location stream.
#[derive(Debug, Clone)]
pub struct LocationSampler {
    receiver: watch::Receiver<LocationState>,
}

impl LocationSampler {
    /// The state at this very moment.
    pub fn snapshot(&self) -> LocationState {
        self.receiver.borrow().clone()
    }

    pub fn current_fix(&self) -> Option<GeoPoint> {
        self.receiver.borrow().fix
    }

    pub fn is_acquiring(&self) -> bool {
        self.receiver.borrow().acquiring
    }

    pub fn last_error(&self) -> Option<String> {
        self.receiver.borrow().error.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(latitude: f64, longitude: f64) -> GeoPoint {
        GeoPoint {
            latitude,
            longitude,
        }
    }

    #[test]
    fn starts_acquiring_without_fix() {
        let (_feed, sampler) = location_channel();
        assert!(sampler.is_acquiring());
        assert_eq!(sampler.current_fix(), None);
        assert_eq!(sampler.last_error(), None);
    }

    #[test]
    fn sampler_always_sees_the_latest_fix() {
        let (feed, sampler) = location_channel();
        feed.push_fix(point(1.0, 1.0));
        feed.push_fix(point(2.0, 2.0));
        feed.push_fix(point(3.0, 3.0));
        assert_eq!(sampler.current_fix(), Some(point(3.0, 3.0)));
        assert!(!sampler.is_acquiring());
        assert!(sampler.snapshot().updated_at.is_some());
    }

    #[test]
    fn errors_drop_the_fix() {
        let (feed, sampler) = location_channel();
        feed.push_fix(point(1.0, 1.0));
        feed.report_error("permission denied");
        assert_eq!(sampler.current_fix(), None);
        assert_eq!(sampler.last_error().as_deref(), Some("permission denied"));

        feed.push_fix(point(1.0, 1.0));
        assert_eq!(sampler.last_error(), None);
    }

    #[test]
    fn additional_samplers_share_the_feed() {
        let (feed, first) = location_channel();
        let second = feed.sampler();
        feed.publish(LocationState {
            fix: Some(point(5.0, 6.0)),
            acquiring: true,
            error: None,
            updated_at: None,
        });
        assert_eq!(first.current_fix(), second.current_fix());
        assert!(second.is_acquiring());
    }
}
