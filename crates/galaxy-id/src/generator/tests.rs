use std::{
    cell::Cell,
    collections::HashSet,
    rc::Rc,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
        mpsc::{self, Receiver, Sender},
    },
    thread::scope,
    time::Duration,
};

use crate::{
    Backoff, Error, GalaxyId, LockSnowflakeGenerator, NodeIdentity, Poll, SnowflakeGenerator,
    SnowflakeId, TimeSource, WallClock,
};

struct MockTime {
    millis: u64,
}

impl TimeSource for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

/// Plays back a fixed list of readings, advancing only when told to.
#[derive(Clone)]
struct SharedMockStepTime {
    clock: Rc<MockStepTime>,
}

struct MockStepTime {
    values: Vec<u64>,
    index: Cell<usize>,
}

impl SharedMockStepTime {
    fn new(values: Vec<u64>) -> Self {
        Self {
            clock: Rc::new(MockStepTime {
                values,
                index: Cell::new(0),
            }),
        }
    }

    fn step(&self) {
        self.clock.index.set(self.clock.index.get() + 1);
    }
}

impl TimeSource for SharedMockStepTime {
    fn current_millis(&self) -> u64 {
        self.clock.values[self.clock.index.get()]
    }
}

/// Returns `start` for the first `ticks_after` reads, then advances by one
/// millisecond. Counts every read so tests can bound the wait.
struct TickAfterReads {
    start: u64,
    ticks_after: u64,
    reads: AtomicU64,
}

impl TimeSource for TickAfterReads {
    fn current_millis(&self) -> u64 {
        let n = self.reads.fetch_add(1, Ordering::Relaxed);
        if n < self.ticks_after {
            self.start
        } else {
            self.start + 1
        }
    }
}

/// The first read returns `start`, reports that it happened, then stalls
/// until released (or until `stall` elapses). Every later read returns
/// `start + 1`.
struct StalledFirstRead {
    start: u64,
    stall: Duration,
    reads: AtomicU64,
    entered: Mutex<Sender<()>>,
    release: Mutex<Receiver<()>>,
}

impl TimeSource for StalledFirstRead {
    fn current_millis(&self) -> u64 {
        if self.reads.fetch_add(1, Ordering::SeqCst) > 0 {
            return self.start + 1;
        }
        let _ = self.entered.lock().unwrap().send(());
        let _ = self.release.lock().unwrap().recv_timeout(self.stall);
        self.start
    }
}

trait PollExt<T: SnowflakeId> {
    fn unwrap_ready(self) -> T;
    fn unwrap_pending(self) -> u64;
}

impl<T: SnowflakeId> PollExt<T> for Poll<T> {
    fn unwrap_ready(self) -> T {
        match self {
            Self::Ready { id } => id,
            Self::Pending { yield_for } => {
                panic!("unexpected pending (yield for: {yield_for})")
            }
        }
    }

    fn unwrap_pending(self) -> u64 {
        match self {
            Self::Ready { id } => panic!("unexpected ready ({id})"),
            Self::Pending { yield_for } => yield_for,
        }
    }
}

const NODE: NodeIdentity = NodeIdentity::new(3, 17);

#[test]
fn sequence_increments_within_same_tick() {
    let generator: LockSnowflakeGenerator<GalaxyId, _> =
        LockSnowflakeGenerator::new(NODE, MockTime { millis: 42 });

    let id1 = generator.try_poll_id().unwrap().unwrap_ready();
    let id2 = generator.try_poll_id().unwrap().unwrap_ready();
    let id3 = generator.try_poll_id().unwrap().unwrap_ready();

    assert_eq!(id1.timestamp(), 42);
    assert_eq!(id2.timestamp(), 42);
    assert_eq!(id3.timestamp(), 42);
    assert_eq!(id1.sequence(), 0);
    assert_eq!(id2.sequence(), 1);
    assert_eq!(id3.sequence(), 2);
    assert!(id1 < id2 && id2 < id3);
}

#[test]
fn ids_carry_the_node_identity() {
    let generator: LockSnowflakeGenerator<GalaxyId, _> =
        LockSnowflakeGenerator::new(NODE, MockTime { millis: 1_000 });
    let id = generator.try_next_id().unwrap();

    let decoded = GalaxyId::from_raw(id.to_raw());
    assert_eq!(decoded.timestamp(), 1_000);
    assert_eq!(decoded.datacenter_id(), 3);
    assert_eq!(decoded.worker_id(), 17);
    assert_eq!(generator.identity(), NODE);
}

#[test]
fn returns_pending_when_sequence_exhausted() {
    let generator: LockSnowflakeGenerator<GalaxyId, _> = LockSnowflakeGenerator::from_components(
        0,
        NODE,
        GalaxyId::max_sequence(),
        MockTime { millis: 0 },
        Backoff::Spin,
    );
    assert_eq!(generator.try_poll_id().unwrap().unwrap_pending(), 1);
    assert_eq!(generator.identity(), NODE);
}

#[test]
fn rolls_over_to_next_millisecond_with_sequence_zero() {
    let time = SharedMockStepTime::new(vec![42, 43]);
    let generator: LockSnowflakeGenerator<GalaxyId, _> =
        LockSnowflakeGenerator::new(NODE, time.clone());

    for i in 0..=GalaxyId::max_sequence() {
        let id = generator.try_poll_id().unwrap().unwrap_ready();
        assert_eq!(id.sequence(), i);
        assert_eq!(id.timestamp(), 42);
    }

    assert_eq!(generator.try_poll_id().unwrap().unwrap_pending(), 1);

    time.step();

    let id = generator.try_poll_id().unwrap().unwrap_ready();
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
}

#[test]
fn backward_clock_fails_instead_of_minting_lower_id() {
    let time = SharedMockStepTime::new(vec![100, 99, 100]);
    let generator: LockSnowflakeGenerator<GalaxyId, _> =
        LockSnowflakeGenerator::new(NODE, time.clone());

    let first = generator.try_next_id().unwrap();
    time.step();
    assert_eq!(
        generator.try_next_id(),
        Err(Error::ClockMovedBackward {
            last_timestamp: 100,
            now: 99
        })
    );

    // Once the clock catches up, generation resumes strictly above `first`.
    time.step();
    let second = generator.try_next_id().unwrap();
    assert!(second > first);
}

#[test]
fn string_form_falls_back_to_nanos_on_error() {
    let time = SharedMockStepTime::new(vec![100, 99]);
    let generator: LockSnowflakeGenerator<GalaxyId, _> =
        LockSnowflakeGenerator::new(NODE, time.clone());

    let real = generator.next_id_string();
    assert_eq!(real.parse::<GalaxyId>().unwrap().timestamp(), 100);

    time.step();
    let fallback = generator.next_id_string();
    assert!(!fallback.is_empty());
    let nanos: u128 = fallback.parse().unwrap();
    // Nanoseconds since 1970 dwarf any 41-bit millisecond value.
    assert!(nanos > u128::from(GalaxyId::TIMESTAMP_MASK));
}

#[test]
fn timestamp_overflow_is_reported() {
    let generator: LockSnowflakeGenerator<GalaxyId, _> = LockSnowflakeGenerator::new(
        NODE,
        MockTime {
            millis: GalaxyId::TIMESTAMP_MASK + 1,
        },
    );
    assert!(matches!(
        generator.try_poll_id(),
        Err(Error::TimestampOverflow { .. })
    ));
}

#[test]
fn exhausted_sequence_waits_for_the_next_tick() {
    let time = TickAfterReads {
        start: 500,
        ticks_after: GalaxyId::max_sequence() + 1 + 16,
        reads: AtomicU64::new(0),
    };
    let generator: LockSnowflakeGenerator<GalaxyId, _> =
        LockSnowflakeGenerator::with_backoff(NODE, time, Backoff::Yield);

    let mut last = None;
    for _ in 0..=GalaxyId::max_sequence() {
        let id = generator.try_next_id().unwrap();
        assert_eq!(id.timestamp(), 500);
        last = Some(id);
    }

    let id = generator.try_next_id().unwrap();
    assert_eq!(id.timestamp(), 501);
    assert_eq!(id.sequence(), 0);
    assert!(Some(id) > last);

    // 4096 ready reads, 16 pending reads, then the tick.
    let reads = generator.time_source().reads.load(Ordering::Relaxed);
    assert_eq!(reads, GalaxyId::max_sequence() + 1 + 16 + 1);
}

#[test]
fn wall_clock_ids_are_unique_and_increasing() {
    const TOTAL_IDS: usize = 5_000;

    let generator: LockSnowflakeGenerator<GalaxyId, _> =
        LockSnowflakeGenerator::new(NODE, WallClock::default());

    let mut seen = HashSet::with_capacity(TOTAL_IDS);
    let mut previous: Option<GalaxyId> = None;
    for _ in 0..TOTAL_IDS {
        let id = generator.try_next_id().unwrap();
        if let Some(prev) = previous {
            assert!(id > prev, "{id} should be greater than {prev}");
        }
        assert!(seen.insert(id));
        assert_eq!(id.datacenter_id(), 3);
        assert_eq!(id.worker_id(), 17);
        previous = Some(id);
    }
    assert_eq!(seen.len(), TOTAL_IDS);
}

#[test]
fn independent_generators_never_collide() {
    let a: LockSnowflakeGenerator<GalaxyId, _> =
        LockSnowflakeGenerator::new(NodeIdentity::new(1, 1), MockTime { millis: 7 });
    let b: LockSnowflakeGenerator<GalaxyId, _> =
        LockSnowflakeGenerator::new(NodeIdentity::new(1, 2), MockTime { millis: 7 });

    let ids_a: HashSet<_> = (0..100).map(|_| a.try_next_id().unwrap()).collect();
    let ids_b: HashSet<_> = (0..100).map(|_| b.try_next_id().unwrap()).collect();
    assert!(ids_a.is_disjoint(&ids_b));
}

#[test]
fn threaded_generation_is_unique() {
    const THREADS: usize = 8;
    const TOTAL_IDS: usize = 4096 * 32;
    const IDS_PER_THREAD: usize = TOTAL_IDS / THREADS;

    let generator: Arc<LockSnowflakeGenerator<GalaxyId, _>> = Arc::new(
        LockSnowflakeGenerator::with_backoff(NODE, WallClock::default(), Backoff::Yield),
    );
    let seen_ids = Arc::new(Mutex::new(HashSet::with_capacity(TOTAL_IDS)));

    scope(|s| {
        for _ in 0..THREADS {
            let generator = Arc::clone(&generator);
            let seen_ids = Arc::clone(&seen_ids);

            s.spawn(move || {
                let mut last: Option<GalaxyId> = None;
                for _ in 0..IDS_PER_THREAD {
                    let id = generator.try_next_id().unwrap();
                    // Per-thread order must still be increasing.
                    assert!(last.is_none_or(|prev| id > prev));
                    last = Some(id);
                    assert!(seen_ids.lock().unwrap().insert(id));
                }
            });
        }
    });

    let final_count = seen_ids.lock().unwrap().len();
    assert_eq!(final_count, TOTAL_IDS, "Expected {TOTAL_IDS} unique IDs");
}

#[test]
fn clones_share_state() {
    let generator: LockSnowflakeGenerator<GalaxyId, _> =
        LockSnowflakeGenerator::new(NODE, WallClock::default());
    let clone = generator.clone();

    let a = generator.try_next_id().unwrap();
    let b = clone.try_next_id().unwrap();
    assert!(b > a);
}

#[test]
fn trait_object_style_usage_through_generic() {
    fn mint<G: SnowflakeGenerator<GalaxyId>>(generator: &G) -> String {
        generator.next_id_string()
    }

    let generator: LockSnowflakeGenerator<GalaxyId, _> =
        LockSnowflakeGenerator::new(NODE, MockTime { millis: 9 });
    let s = mint(&generator);
    assert_eq!(s.parse::<GalaxyId>().unwrap().timestamp(), 9);
}

#[test]
fn stale_reading_is_not_mistaken_for_regression() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let time = StalledFirstRead {
        start: 100,
        stall: Duration::from_millis(200),
        reads: AtomicU64::new(0),
        entered: Mutex::new(entered_tx),
        release: Mutex::new(release_rx),
    };
    let generator: LockSnowflakeGenerator<GalaxyId, _> = LockSnowflakeGenerator::new(NODE, time);

    let (slow, fast) = scope(|s| {
        let slow = s.spawn(|| generator.try_next_id());
        // The slow caller has read 100 and is stalled inside the clock.
        entered_rx.recv().unwrap();
        let fast = generator.try_next_id();
        let _ = release_tx.send(());
        (slow.join().unwrap(), fast)
    });

    let slow = slow.expect("clock never regressed");
    let fast = fast.expect("clock never regressed");
    assert_eq!(slow.timestamp(), 100);
    assert_eq!(fast.timestamp(), 101);
    assert!(fast > slow);
}
