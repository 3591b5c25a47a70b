use alloc::vec::Vec;

/// 块 I/O 操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

/// 一次块 I/O 请求：从 start_sector 对应的字节偏移开始，
/// 按顺序依次消费各个传输段。
/// 段缓冲区归宿主框架（调用方）所有，这里只做借用，
/// 用枚举区分读写，让缓冲区的可变性与传输方向在类型上一致：
/// 读请求写入段缓冲区，写请求读取段缓冲区。
/// 请求与段都是瞬态对象，process() 返回后即可丢弃。
pub enum Request<'a> {
    /// 从设备读出数据到各段缓冲区
    Read {
        start_sector: usize,
        segments: Vec<&'a mut [u8]>,
    },
    /// 把各段缓冲区的数据写入设备
    Write {
        start_sector: usize,
        segments: Vec<&'a [u8]>,
    },
}

impl<'a> Request<'a> {
    pub fn operation(&self) -> Operation {
        match self {
            Request::Read { .. } => Operation::Read,
            Request::Write { .. } => Operation::Write,
        }
    }

    /// 起始地址，以扇区为单位（不是字节）
    pub fn start_sector(&self) -> usize {
        match self {
            Request::Read { start_sector, .. } => *start_sector,
            Request::Write { start_sector, .. } => *start_sector,
        }
    }

    /// 所有段的字节总长
    pub fn total_len(&self) -> usize {
        match self {
            Request::Read { segments, .. } => segments.iter().map(|s| s.len()).sum(),
            Request::Write { segments, .. } => segments.iter().map(|s| s.len()).sum(),
        }
    }

    pub fn segment_count(&self) -> usize {
        match self {
            Request::Read { segments, .. } => segments.len(),
            Request::Write { segments, .. } => segments.len(),
        }
    }
}
