#![cfg_attr(not(test), no_std)]

/// 扇区大小（字节数）
pub const SECTOR_SZ: usize = 512;
/// 扇区总数。512 × 1024 = 512KiB 总容量
pub const NSECTORS: usize = 1024;
/// 注册到宿主框架的设备名
pub const DISK_NAME: &str = "memblk";
/// 请求队列深度，创建队列时告知宿主框架
pub const QUEUE_DEPTH: usize = 128;

extern crate alloc;

mod device;
mod dispatch;
mod error;
mod host;
mod lifecycle;
mod request;

pub use device::MemDisk;
pub use dispatch::RequestDispatcher;
pub use error::{InitError, IoError};
pub use host::{DiskInfo, HostFramework};
pub use lifecycle::{activate, deactivate, LifecycleManager, LifecycleState};
pub use request::{Operation, Request};
