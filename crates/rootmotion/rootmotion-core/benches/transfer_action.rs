//! Benchmarks for the transfer operator.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rootmotion_core::{
    apply_transfer, evaluate_pose, transfer_location, Action, Armature, Bone, BlendData,
    TransferConfig,
};

fn walk_scene() -> BlendData {
    let json = rootmotion_test_fixtures::scenes::json("mixamo-walk").expect("load mixamo-walk");
    BlendData::from_json(&json).expect("parse mixamo-walk")
}

fn bench_apply_transfer(c: &mut Criterion) {
    let scene = walk_scene();
    let cfg = TransferConfig::default();

    c.bench_function("apply_transfer_first_run", |b| {
        b.iter_batched(
            || scene.clone(),
            |mut data| apply_transfer(black_box(&mut data), &cfg),
            BatchSize::SmallInput,
        )
    });

    let mut rerun = scene.clone();
    apply_transfer(&mut rerun, &cfg);
    c.bench_function("apply_transfer_rerun", |b| {
        b.iter_batched(
            || rerun.clone(),
            |mut data| apply_transfer(black_box(&mut data), &cfg),
            BatchSize::SmallInput,
        )
    });
}

fn bench_location(c: &mut Criterion) {
    let action: Action = rootmotion_test_fixtures::actions::load("crouch-below-ground")
        .expect("load crouch-below-ground");
    let armature = Armature::new(vec![Bone::new("Root"), Bone::new("Hips")]);
    let cfg = TransferConfig::default();

    c.bench_function("transfer_location_all_axes", |b| {
        b.iter_batched(
            || action.clone(),
            |mut a| transfer_location(&armature, black_box(&mut a), &cfg, None),
            BatchSize::SmallInput,
        )
    });
}

fn bench_evaluate_pose(c: &mut Criterion) {
    let scene = walk_scene();
    let armature = scene.armature("Armature").expect("armature").clone();
    let walk = scene.action("Walk").expect("walk").clone();

    c.bench_function("evaluate_pose_walk", |b| {
        b.iter(|| {
            for frame in 1..=10 {
                black_box(evaluate_pose(&walk, &armature, black_box(frame)));
            }
        })
    });
}

criterion_group!(benches, bench_apply_transfer, bench_location, bench_evaluate_pose);
criterion_main!(benches);
