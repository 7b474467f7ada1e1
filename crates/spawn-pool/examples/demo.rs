//! Example: Driving the spawn pool from a scene loop

use spawn_pool::{InstanceHost, PoolConfig, RegionEvents, SpawnPool, Transform};

/// Toy backend that prints what a real scene system would do.
#[derive(Default)]
struct ConsoleHost {
    next_id: usize,
}

impl InstanceHost for ConsoleHost {
    type Handle = usize;

    fn create(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        println!("  [host] created instance {id}");
        id
    }

    fn destroy(&mut self, handle: usize) {
        println!("  [host] destroyed instance {handle}");
    }

    fn set_active(&mut self, handle: usize, active: bool) {
        println!("  [host] instance {handle} active = {active}");
    }

    fn is_alive(&self, _handle: usize) -> bool {
        true
    }

    fn place(&mut self, handle: usize, transform: &Transform) {
        println!("  [host] instance {handle} placed at {:?}", transform.position);
    }
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let mut events = RegionEvents::new();
    let config = PoolConfig {
        max_size: Some(4),
        prewarm: 2,
    };
    config.validate().expect("valid pool configuration");

    let mut pool = SpawnPool::new(ConsoleHost::default(), config);
    pool.activate(&mut events);
    println!("spawn-pool v{}: pool ready with {} entries", spawn_pool::VERSION, pool.len());

    // Region 1 spawns two things, one at a spawn point
    println!("spawning for region 1");
    let a = pool.checkout(1).expect("pool has capacity");
    let b = pool
        .checkout_at(1, &Transform::at([12.0, 0.0, -3.5]))
        .expect("pool has capacity");

    // One comes back by hand
    println!("returning instance {a}");
    pool.checkin(a);

    // The region is torn down; the pool reclaims what it still held
    println!("unloading region 1");
    events.region_unloaded(1);
    pool.pump_region_events();
    assert_eq!(pool.free(), pool.len());

    println!(
        "done: {} created, {} reused, instance {b} reclaimed by teardown",
        pool.stats().created,
        pool.stats().reused
    );

    pool.deactivate();
    pool.clear();
}
