use crate::dispatch::RequestDispatcher;
use crate::{DISK_NAME, NSECTORS, SECTOR_SZ};

/// 注册时暴露给宿主框架的设备标识信息。
/// 与请求的成败无关，注册之后随时可查。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskInfo {
    /// 设备名，宿主框架以此命名设备节点
    pub name: &'static str,
    /// 扇区大小（字节）
    pub sector_size: usize,
    /// 扇区总数
    pub sector_count: usize,
}

impl DiskInfo {
    /// 本模块固定的设备参数：512 字节扇区 × 1024 个 = 512KiB
    pub fn fixed() -> Self {
        Self {
            name: DISK_NAME,
            sector_size: SECTOR_SZ,
            sector_count: NSECTORS,
        }
    }

    pub fn capacity_bytes(&self) -> usize {
        self.sector_count * self.sector_size
    }

    /// 逻辑块大小与扇区大小一致
    pub fn logical_block_size(&self) -> usize {
        self.sector_size
    }
}

/// 宿主存储框架接口。
/// 作为与宿主框架之间的边界，向下隐藏队列创建、设备节点注册等细节，
/// LifecycleManager 只通过这几个窄接口与外界交互。
/// 两类句柄都按值交付、按值归还，失败回滚时按获取的逆序释放。
pub trait HostFramework {
    /// 请求队列句柄
    type Queue;
    /// 设备节点句柄
    type DiskNode;

    /// 创建请求队列并挂上分发器，此后宿主框架经由该分发器提交请求
    fn init_queue(
        &self,
        dispatcher: RequestDispatcher,
        depth: usize,
    ) -> Result<Self::Queue, ()>;

    /// 注册设备节点，设备由此对外可见
    fn add_disk(&self, info: &DiskInfo) -> Result<Self::DiskNode, ()>;

    /// 注销设备节点
    fn remove_disk(&self, node: Self::DiskNode);

    /// 释放请求队列
    fn release_queue(&self, queue: Self::Queue);
}
