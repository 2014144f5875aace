pub mod baremetal;
pub mod floatingip;
pub mod lbmember;
pub mod lbpool;
pub mod router;
pub mod secret;
pub mod volume;

pub use baremetal::BaremetalResource;
pub use floatingip::FloatingIpResource;
pub use lbmember::LbMemberResource;
pub use lbpool::LbPoolResource;
pub use router::RouterResource;
pub use secret::SecretResource;
pub use volume::VolumeResource;
