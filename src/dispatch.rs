use alloc::sync::Arc;

use log::{debug, warn};

use crate::device::MemDisk;
use crate::error::IoError;
use crate::request::Request;

/// 请求分发器：把一个请求落实为对后备存储的边界检查内存拷贝。
/// 可 Clone，宿主框架的每个队列上下文各持有一份，
/// process() 不阻塞、不等待 I/O，可以从任意上下文并发调用。
#[derive(Clone)]
pub struct RequestDispatcher {
    device: Arc<MemDisk>,
}

impl RequestDispatcher {
    pub fn new(device: Arc<MemDisk>) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &Arc<MemDisk> {
        &self.device
    }

    /// 处理一个请求。
    /// 先过就绪门，再对整个请求的字节范围做一次性越界检查，
    /// 全部通过后才开始拷贝，BoundsViolation 因此不会留下部分写入。
    /// 重试、排队、合并都归宿主框架，这里没有。
    pub fn process(&self, req: &mut Request<'_>) -> Result<(), IoError> {
        if !self.device.is_ready() {
            return Err(IoError::NotReady);
        }
        let start = req
            .start_sector()
            .checked_mul(self.device.sector_size())
            .ok_or(IoError::BoundsViolation)?;
        let end = start
            .checked_add(req.total_len())
            .ok_or(IoError::BoundsViolation)?;
        if end > self.device.capacity_bytes() {
            warn!(
                "memblk: request [{}, {}) exceeds capacity {}",
                start,
                end,
                self.device.capacity_bytes()
            );
            return Err(IoError::BoundsViolation);
        }
        let mut data = self.device.data().lock();
        let mut cursor = start;
        match req {
            Request::Read { segments, .. } => {
                for seg in segments.iter_mut() {
                    let next = cursor + seg.len();
                    seg.copy_from_slice(&data[cursor..next]);
                    cursor = next;
                }
            }
            Request::Write { segments, .. } => {
                for seg in segments.iter() {
                    let next = cursor + seg.len();
                    data[cursor..next].copy_from_slice(seg);
                    cursor = next;
                }
            }
        }
        Ok(())
    }

    /// 对应宿主框架的 open 回调：设备未就绪时拒绝打开
    pub fn open(&self) -> Result<(), IoError> {
        if !self.device.is_ready() {
            return Err(IoError::NotReady);
        }
        debug!("memblk: device opened");
        Ok(())
    }

    /// 对应宿主框架的 release 回调
    pub fn release(&self) {
        debug!("memblk: device released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NSECTORS, SECTOR_SZ};
    use alloc::vec;
    use alloc::vec::Vec;

    fn ready_dispatcher() -> RequestDispatcher {
        let disk = Arc::new(MemDisk::new(NSECTORS, SECTOR_SZ).unwrap());
        disk.mark_ready();
        RequestDispatcher::new(disk)
    }

    fn read_sector(dispatcher: &RequestDispatcher, sector: usize) -> Vec<u8> {
        let mut buf = vec![0u8; SECTOR_SZ];
        let mut req = Request::Read {
            start_sector: sector,
            segments: vec![&mut buf[..]],
        };
        dispatcher.process(&mut req).unwrap();
        buf
    }

    #[test]
    fn write_then_read_round_trip() {
        let dispatcher = ready_dispatcher();
        let pattern = [0xAAu8; SECTOR_SZ];
        let mut req = Request::Write {
            start_sector: 0,
            segments: vec![&pattern[..]],
        };
        dispatcher.process(&mut req).unwrap();
        assert_eq!(read_sector(&dispatcher, 0), &pattern[..]);
    }

    #[test]
    fn multi_segment_round_trip() {
        let dispatcher = ready_dispatcher();
        // 写入 3 段共 2.5 个扇区，再用不同的切分方式读回
        let a = [0x11u8; SECTOR_SZ];
        let b = [0x22u8; SECTOR_SZ];
        let c = [0x33u8; SECTOR_SZ / 2];
        let mut req = Request::Write {
            start_sector: 5,
            segments: vec![&a[..], &b[..], &c[..]],
        };
        dispatcher.process(&mut req).unwrap();

        let mut front = vec![0u8; SECTOR_SZ / 2];
        let mut back = vec![0u8; SECTOR_SZ * 2];
        let mut req = Request::Read {
            start_sector: 5,
            segments: vec![&mut front[..], &mut back[..]],
        };
        dispatcher.process(&mut req).unwrap();
        assert_eq!(&front[..], &a[..SECTOR_SZ / 2]);
        assert_eq!(&back[..SECTOR_SZ / 2], &a[SECTOR_SZ / 2..]);
        assert_eq!(&back[SECTOR_SZ / 2..SECTOR_SZ + SECTOR_SZ / 2], &b[..]);
        assert_eq!(&back[SECTOR_SZ + SECTOR_SZ / 2..], &c[..]);
    }

    #[test]
    fn out_of_range_request_rejected() {
        let dispatcher = ready_dispatcher();
        // 从最后一个扇区起跨出容量
        let data = [0xAAu8; 2 * SECTOR_SZ];
        let mut req = Request::Write {
            start_sector: NSECTORS - 1,
            segments: vec![&data[..]],
        };
        assert_eq!(dispatcher.process(&mut req), Err(IoError::BoundsViolation));
        // 最后一个扇区保持初始的全零
        assert!(read_sector(&dispatcher, NSECTORS - 1).iter().all(|&b| b == 0));
    }

    #[test]
    fn bounds_violation_applies_no_segment() {
        let dispatcher = ready_dispatcher();
        // 首段在容量内、次段越界：整个请求拒绝，首段也不落盘
        let a = [0x55u8; SECTOR_SZ];
        let b = [0x66u8; 2 * SECTOR_SZ];
        let mut req = Request::Write {
            start_sector: NSECTORS - 2,
            segments: vec![&a[..], &b[..]],
        };
        assert_eq!(dispatcher.process(&mut req), Err(IoError::BoundsViolation));
        assert!(read_sector(&dispatcher, NSECTORS - 2).iter().all(|&b| b == 0));
        assert!(read_sector(&dispatcher, NSECTORS - 1).iter().all(|&b| b == 0));
    }

    #[test]
    fn sector_offset_overflow_is_bounds_violation() {
        let dispatcher = ready_dispatcher();
        let data = [0u8; 16];
        let mut req = Request::Write {
            start_sector: usize::MAX / 2,
            segments: vec![&data[..]],
        };
        assert_eq!(dispatcher.process(&mut req), Err(IoError::BoundsViolation));
    }

    #[test]
    fn not_ready_disk_rejects_and_leaves_store_untouched() {
        let disk = Arc::new(MemDisk::new(NSECTORS, SECTOR_SZ).unwrap());
        let dispatcher = RequestDispatcher::new(Arc::clone(&disk));
        let data = [0xFFu8; SECTOR_SZ];
        let mut req = Request::Write {
            start_sector: 0,
            segments: vec![&data[..]],
        };
        assert_eq!(dispatcher.process(&mut req), Err(IoError::NotReady));
        // 门打开之后可以看到存储没有被动过
        disk.mark_ready();
        assert!(read_sector(&dispatcher, 0).iter().all(|&b| b == 0));
    }

    #[test]
    fn open_requires_ready() {
        let disk = Arc::new(MemDisk::new(NSECTORS, SECTOR_SZ).unwrap());
        let dispatcher = RequestDispatcher::new(Arc::clone(&disk));
        assert_eq!(dispatcher.open(), Err(IoError::NotReady));
        disk.mark_ready();
        assert_eq!(dispatcher.open(), Ok(()));
        dispatcher.release();
    }

    #[test]
    fn empty_request_is_ok() {
        let dispatcher = ready_dispatcher();
        let mut req = Request::Write {
            start_sector: 0,
            segments: vec![],
        };
        assert_eq!(dispatcher.process(&mut req), Ok(()));
    }

    #[test]
    fn capacity_is_stable_across_requests() {
        let dispatcher = ready_dispatcher();
        let before = dispatcher.device().capacity_bytes();
        let data = [1u8; SECTOR_SZ];
        let mut req = Request::Write {
            start_sector: 3,
            segments: vec![&data[..]],
        };
        dispatcher.process(&mut req).unwrap();
        let mut req = Request::Write {
            start_sector: NSECTORS,
            segments: vec![&data[..]],
        };
        let _ = dispatcher.process(&mut req);
        assert_eq!(dispatcher.device().capacity_bytes(), before);
    }
}
