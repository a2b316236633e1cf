pub mod alerts;
pub mod board;
pub mod cache;
pub mod config;
pub mod feed;
pub mod gtfs;
pub mod http;
pub mod projection;
pub mod settings;
pub mod shared;
pub mod stops;

pub mod prelude {
    pub use crate::alerts::{AlertEvaluator, AlertEvent, AlertKey, AlertReason, AlertThresholds};
    pub use crate::board::{
        Action, Board, BoardState, Changes, Field, LogNotifier, Notifier, Persist, RefreshGate,
        Scheduler, SearchOutcome, StopSearch,
    };
    pub use crate::cache::{OfflineStore, is_compatible};
    pub use crate::config::Config;
    pub use crate::feed::{RawDeparture, TransitFeedClient, VehicleInfo, VehicleInfos};
    pub use crate::http::{ReqwestTransport, Transport};
    pub use crate::projection::{DisplayRow, FilterSet, ProjectionConfig, TransportMode, project};
    pub use crate::settings::{AccessibilityFilter, ModeVisibility, UserPreferences};
    pub use crate::stops::{StopGroup, StopIndex};
}
