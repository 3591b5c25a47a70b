use alloc::boxed::Box;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, Ordering};

use spin::Mutex;

use crate::error::InitError;

/// 内存盘：后备存储 + 就绪门。
/// 纯数据持有者，除构造/销毁与就绪标志切换外没有行为，
/// 对存储的读写全部在 RequestDispatcher 中完成。
pub struct MemDisk {
    /// 后备存储：定长连续字节缓冲区，容量 = sector_count × sector_size，
    /// 构造时一次性分配并清零，生命周期内不再变动。
    /// 块设备语义下调用方负责不提交相互重叠的并发 I/O，
    /// 这里仍整体加互斥锁，重叠请求退化为串行执行而不是数据竞争。
    data: Mutex<Box<[u8]>>,
    /// 就绪门：资源全部获取成功前为 false，开始下线后也为 false。
    /// process() 以 Acquire 读，LifecycleManager 以 Release 写，
    /// 看到 true 的请求一定也能看到初始化完整的缓冲区。
    ready: AtomicBool,
    sector_size: usize,
    sector_count: usize,
}

impl MemDisk {
    /// 分配并清零后备存储。
    /// 内存不足或 sector_count × sector_size 溢出返回 AllocationFailure。
    pub fn new(sector_count: usize, sector_size: usize) -> Result<Self, InitError> {
        let capacity = sector_count
            .checked_mul(sector_size)
            .ok_or(InitError::AllocationFailure)?;
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| InitError::AllocationFailure)?;
        data.resize(capacity, 0);
        Ok(Self {
            data: Mutex::new(data.into_boxed_slice()),
            ready: AtomicBool::new(false),
            sector_size,
            sector_count,
        })
    }

    /// 扇区大小（字节），同时是逻辑块大小
    pub fn sector_size(&self) -> usize {
        self.sector_size
    }

    pub fn sector_count(&self) -> usize {
        self.sector_count
    }

    /// 容量（字节），构造之后不变
    pub fn capacity_bytes(&self) -> usize {
        self.sector_count * self.sector_size
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// 仅由 LifecycleManager 在三步资源全部获取成功后调用一次
    pub(crate) fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// 仅由 LifecycleManager 在下线时调用一次，先于后备存储释放，
    /// 在途请求由此观察到 NotReady 而不是已释放的缓冲区
    pub(crate) fn mark_not_ready(&self) {
        self.ready.store(false, Ordering::Release);
    }

    pub(crate) fn data(&self) -> &Mutex<Box<[u8]>> {
        &self.data
    }
}
