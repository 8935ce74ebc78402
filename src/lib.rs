
pub mod cli {
    pub mod args;
}

pub mod memory {
    pub mod frame_pool;
    pub mod manager;
    pub mod page_table;
    pub mod shared;
}

pub mod sim {
    pub mod driver;
    pub mod log_sink;
    pub mod process;
    pub mod report;
    pub mod trace;
    pub mod workload;
}
