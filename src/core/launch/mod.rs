pub mod arguments;
pub mod classpath;
pub mod task;

pub use arguments::{ensure_resolved, expand, SubstitutionTable};
pub use classpath::{classpath_separator, join_classpath, NativesDir};
pub use task::{build_launch_arguments, spawn_game, LaunchedGame};
