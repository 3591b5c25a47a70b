use alloc::sync::Arc;

use log::{error, info};

use crate::device::MemDisk;
use crate::dispatch::RequestDispatcher;
use crate::error::InitError;
use crate::host::{DiskInfo, HostFramework};
use crate::QUEUE_DEPTH;

/// 设备生命周期状态，只向前推进，Destroyed 之后不再重新初始化。
/// 初始化中途失败走 Initializing → Destroyed 捷径（不经过 Ready）。
/// 状态属于一次设备实例：失败的 start() 销毁的是该次的设备，
/// 管理器本身回到 Uninitialized，下一次 start() 会铸造新的设备。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Initializing,
    Ready,
    ShuttingDown,
    Destroyed,
}

/// 生命周期管理器：按固定顺序获取资源，任一步失败则逆序释放此前所有资源。
/// 顺序：后备存储 → 请求队列 → 设备注册。
/// 只有三步全部成功后才打开就绪门，设备才对外可见、可处理请求。
pub struct LifecycleManager<H: HostFramework> {
    host: H,
    info: DiskInfo,
    state: LifecycleState,
    device: Option<Arc<MemDisk>>,
    queue: Option<H::Queue>,
    node: Option<H::DiskNode>,
}

impl<H: HostFramework> LifecycleManager<H> {
    pub fn new(host: H, info: DiskInfo) -> Self {
        Self {
            host,
            info,
            state: LifecycleState::Uninitialized,
            device: None,
            queue: None,
            node: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn info(&self) -> &DiskInfo {
        &self.info
    }

    /// 就绪后供宿主框架取用的分发器，每个队列上下文 clone 一份
    pub fn dispatcher(&self) -> Option<RequestDispatcher> {
        self.device
            .as_ref()
            .map(|device| RequestDispatcher::new(Arc::clone(device)))
    }

    /// 启动。宿主框架在模块装载时调用一次；
    /// 一次失败的尝试释放干净后允许再次调用。
    pub fn start(&mut self) -> Result<(), InitError> {
        assert_eq!(
            self.state,
            LifecycleState::Uninitialized,
            "start() on an already started manager"
        );
        self.state = LifecycleState::Initializing;
        info!("memblk: initialization started");

        // 1. 后备存储
        let device = match MemDisk::new(self.info.sector_count, self.info.sector_size) {
            Ok(device) => Arc::new(device),
            Err(e) => {
                error!("memblk: backing store allocation failed");
                self.state = LifecycleState::Uninitialized;
                return Err(e);
            }
        };

        // 2. 请求队列
        let dispatcher = RequestDispatcher::new(Arc::clone(&device));
        let queue = match self.host.init_queue(dispatcher, QUEUE_DEPTH) {
            Ok(queue) => queue,
            Err(()) => {
                error!("memblk: queue initialization failed");
                // 逆序释放：此时只持有后备存储，该设备实例就此销毁
                drop(device);
                self.state = LifecycleState::Uninitialized;
                return Err(InitError::QueueInitFailure);
            }
        };

        // 3. 设备注册
        let node = match self.host.add_disk(&self.info) {
            Ok(node) => node,
            Err(()) => {
                error!("memblk: disk registration failed");
                self.host.release_queue(queue);
                drop(device);
                self.state = LifecycleState::Uninitialized;
                return Err(InitError::RegistrationFailure);
            }
        };

        // 全部资源就位，打开就绪门，设备自此对外可用
        device.mark_ready();
        self.device = Some(device);
        self.queue = Some(queue);
        self.node = Some(node);
        self.state = LifecycleState::Ready;
        info!(
            "memblk: initialization completed, {} sectors × {} bytes",
            self.info.sector_count, self.info.sector_size
        );
        Ok(())
    }

    /// 下线。可重复调用，后续调用为空操作。
    /// 顺序：注销设备节点 → 释放请求队列 → 关就绪门 → 释放后备存储。
    /// 就绪门先于存储释放关闭，之后到达的请求只会看到 NotReady；
    /// 已越过门的在途请求经 Arc 持有缓冲区，不会触及已释放内存。
    /// 排空在途请求是宿主框架的前置义务，这里不做强制取消。
    pub fn stop(&mut self) {
        match self.state {
            LifecycleState::Ready => {
                self.state = LifecycleState::ShuttingDown;
                info!("memblk: shutdown started");
                if let Some(node) = self.node.take() {
                    self.host.remove_disk(node);
                }
                if let Some(queue) = self.queue.take() {
                    self.host.release_queue(queue);
                }
                if let Some(device) = self.device.take() {
                    device.mark_not_ready();
                }
                self.state = LifecycleState::Destroyed;
                info!("memblk: shutdown completed");
            }
            LifecycleState::Uninitialized | LifecycleState::Initializing => {
                // start 未完成：此时至多持有后备存储
                self.device.take();
                self.state = LifecycleState::Destroyed;
            }
            LifecycleState::ShuttingDown | LifecycleState::Destroyed => {}
        }
    }
}

impl<H: HostFramework> Drop for LifecycleManager<H> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// 模块激活入口：以固定设备参数启动生命周期管理器，
/// 宿主框架在模块装载时调用一次
pub fn activate<H: HostFramework>(host: H) -> Result<LifecycleManager<H>, InitError> {
    let mut manager = LifecycleManager::new(host, DiskInfo::fixed());
    manager.start()?;
    Ok(manager)
}

/// 模块卸载入口，与 activate 配对调用一次
pub fn deactivate<H: HostFramework>(mut manager: LifecycleManager<H>) {
    manager.stop();
}
