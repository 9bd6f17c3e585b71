pub mod graffiti;
pub mod logging;
