pub mod canon;
pub mod cmdline;
pub mod config;
pub mod fs;
pub mod graph;
pub mod includes;
pub mod load;
pub mod progress;
pub mod run;
pub mod scanner;
mod signal;
pub mod smallmap;
pub mod task;
pub mod work;
