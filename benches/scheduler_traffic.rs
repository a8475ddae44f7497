use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::Throughput;
use criterion::{criterion_group, criterion_main};
use std::cell::RefCell;
use std::rc::Rc;

use scheduled_mpc_with_beaver::channel_utils::memory_channel::create_memory_agents;
use scheduled_mpc_with_beaver::engine::prg::random_seed;
use scheduled_mpc_with_beaver::engine::tuple_generator::SharedSeedTupleGenerator;
use scheduled_mpc_with_beaver::engine::BeaverSecretShareEngine;
use scheduled_mpc_with_beaver::scheduler::eager::EagerScheduler;
use scheduled_mpc_with_beaver::scheduler::gate_keeper::GateKeeper;
use scheduled_mpc_with_beaver::scheduler::lazy::LazyScheduler;
use scheduled_mpc_with_beaver::scheduler::wire_keeper::WireKeeper;
use scheduled_mpc_with_beaver::scheduler::Scheduler;

const NPARTIES: usize = 2;

fn and_level_routine(scheduler: &mut dyn Scheduler, size: usize) {
    let lefts: Vec<_> = (0..size)
        .map(|i| scheduler.private_boolean_input(i % 2 == 0, 0).unwrap())
        .collect();
    let rights: Vec<_> = (0..size)
        .map(|i| scheduler.private_boolean_input(i % 3 == 0, 1).unwrap())
        .collect();
    let outputs: Vec<_> = lefts
        .iter()
        .zip(&rights)
        .map(|(l, r)| scheduler.private_and_private(*l, *r).unwrap())
        .collect();
    for output in outputs {
        scheduler.extract_boolean_secret_share(output).unwrap();
    }
}

fn run_parties(lazy: bool, size: usize) {
    let seed = random_seed();
    let handles: Vec<_> = create_memory_agents(NPARTIES)
        .into_iter()
        .enumerate()
        .map(|(me, agents)| {
            std::thread::spawn(move || {
                let generator = SharedSeedTupleGenerator::new(seed, me, NPARTIES);
                let engine =
                    BeaverSecretShareEngine::new(Box::new(generator), agents, me, NPARTIES)
                        .unwrap();
                if lazy {
                    let wires = Rc::new(RefCell::new(WireKeeper::new()));
                    let gates = GateKeeper::new(wires.clone());
                    let mut scheduler = LazyScheduler::new(Box::new(engine), wires, gates);
                    and_level_routine(&mut scheduler, size);
                } else {
                    let mut scheduler = EagerScheduler::new(Box::new(engine), WireKeeper::new());
                    and_level_routine(&mut scheduler, size);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}

fn bench_and_levels(c: &mut Criterion) {
    let min_e = 4;
    let max_e = 9;

    let mut group = c.benchmark_group("and_level_time");
    for e in min_e..=max_e {
        let size: usize = 1 << e;
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("Eager", size), &size, |b, &size| {
            b.iter(|| run_parties(false, size))
        });
        group.bench_with_input(BenchmarkId::new("Lazy", size), &size, |b, &size| {
            b.iter(|| run_parties(true, size))
        });
    }
    group.finish();
}

criterion_group!(
    name = scheduler_benches;
    config = Criterion::default().sample_size(10);
    targets = bench_and_levels
);
criterion_main!(scheduler_benches);

// cargo bench and_level_time
