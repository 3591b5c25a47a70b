/// 初始化阶段的错误，只会由 start() 返回。
/// 任一错误返回之前，本次已获取的资源都已按逆序释放完毕，
/// 宿主框架据此把模块装载判定为失败，设备不会对外可见。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// 后备存储内存无法预留（含容量计算溢出）
    AllocationFailure,
    /// 宿主框架请求队列创建失败
    QueueInitFailure,
    /// 宿主框架设备节点注册失败
    RegistrationFailure,
}

/// 单个请求的错误，同步返回给 process() 的调用方。
/// 在宿主边界统一映射为一般 I/O 错误，不会影响设备本身，
/// 设备名与容量在失败的请求之后依然可查。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoError {
    /// 设备尚未就绪：初始化未完成，或已开始下线
    NotReady,
    /// 请求的字节范围超出设备容量
    BoundsViolation,
}
