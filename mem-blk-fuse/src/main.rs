use clap::{App, Arg};
use log::info;
use mem_blk::{
    activate, deactivate, DiskInfo, HostFramework, Request, RequestDispatcher, NSECTORS,
    SECTOR_SZ,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 宿主框架替身：队列句柄即分发器本身，设备节点用路径字符串代替
struct HostStub;

impl HostFramework for HostStub {
    type Queue = RequestDispatcher;
    type DiskNode = String;

    fn init_queue(
        &self,
        dispatcher: RequestDispatcher,
        depth: usize,
    ) -> Result<Self::Queue, ()> {
        info!("host: request queue created, depth {}", depth);
        Ok(dispatcher)
    }

    fn add_disk(&self, info: &DiskInfo) -> Result<Self::DiskNode, ()> {
        info!(
            "host: disk {} registered, {} bytes",
            info.name,
            info.capacity_bytes()
        );
        Ok(format!("/dev/{}0", info.name))
    }

    fn remove_disk(&self, node: Self::DiskNode) {
        info!("host: {} removed", node);
    }

    fn release_queue(&self, _queue: Self::Queue) {
        info!("host: request queue released");
    }
}

fn main() {
    env_logger::init();
    let matches = App::new("MemBlkFuse")
        .arg(
            Arg::with_name("rounds")
                .short("r")
                .long("rounds")
                .takes_value(true)
                .help("Number of random write/read rounds"),
        )
        .arg(
            Arg::with_name("seed")
                .short("s")
                .long("seed")
                .takes_value(true)
                .help("RNG seed"),
        )
        .get_matches();
    let rounds: usize = matches
        .value_of("rounds")
        .unwrap_or("64")
        .parse()
        .expect("invalid rounds");
    let seed: u64 = matches
        .value_of("seed")
        .unwrap_or("0")
        .parse()
        .expect("invalid seed");

    let manager = activate(HostStub).expect("memblk activation failed");
    let dispatcher = manager.dispatcher().unwrap();
    let mut rng = StdRng::seed_from_u64(seed);
    for round in 0..rounds {
        let start = rng.gen_range(0..NSECTORS);
        let sectors = rng.gen_range(1..=(NSECTORS - start).min(8));
        let mut pattern = vec![0u8; sectors * SECTOR_SZ];
        rng.fill(&mut pattern[..]);

        let mut req = Request::Write {
            start_sector: start,
            segments: vec![&pattern[..]],
        };
        dispatcher.process(&mut req).expect("write failed");

        let mut readback = vec![0u8; pattern.len()];
        let mut req = Request::Read {
            start_sector: start,
            segments: vec![&mut readback[..]],
        };
        dispatcher.process(&mut req).expect("read failed");
        assert_eq!(pattern, readback, "round {}: data mismatch", round);
    }
    println!("memblk fuse: {} rounds passed", rounds);
    deactivate(manager);
}
