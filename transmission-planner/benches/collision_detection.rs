use criterion::{criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use transmission_planner::{
    generate_random_values_from_ranges, AxisRange, BodyCollisionDetector, FromUrdf, Pose,
    ShapeSet,
};

const OBSTACLES: &str = r#"
<robot name="gearbox">
  <link name="housing">
    <collision>
      <origin xyz="0 400 0" rpy="0 0 0"/>
      <geometry>
        <box size="400 40 200"/>
      </geometry>
    </collision>
    <collision>
      <origin xyz="-500 300 0" rpy="0 0 0"/>
      <geometry>
        <cylinder radius="60" length="200"/>
      </geometry>
    </collision>
    <collision>
      <origin xyz="150 650 0" rpy="0 0 0"/>
      <geometry>
        <sphere radius="80"/>
      </geometry>
    </collision>
  </link>
</robot>
"#;

const SHAFT: &str = r#"
<robot name="shaft">
  <link name="shaft">
    <collision>
      <origin xyz="0 0 0" rpy="0 1.5707963 0"/>
      <geometry>
        <cylinder radius="20" length="300"/>
      </geometry>
    </collision>
  </link>
</robot>
"#;

fn detector() -> BodyCollisionDetector {
    let obstacles = ShapeSet::from_urdf_robot(&urdf_rs::read_from_string(OBSTACLES).unwrap());
    let body = ShapeSet::from_urdf_robot(&urdf_rs::read_from_string(SHAFT).unwrap());
    BodyCollisionDetector::new(body, obstacles, 0.0).unwrap()
}

const RANGES: [AxisRange; 3] = [
    AxisRange::new(-881, 276),
    AxisRange::new(100, 820),
    AxisRange::new(-90, 90),
];

fn random_pose(rng: &mut StdRng) -> Pose {
    let v = generate_random_values_from_ranges(rng, &RANGES);
    Pose::from_parts([v[0], v[1], 0.0], [0.0, 0.0, v[2]])
}

fn bench_pose_collision(c: &mut Criterion) {
    let detector = detector();
    let mut rng = StdRng::seed_from_u64(0);
    c.bench_function("bench_pose_collision", |b| {
        b.iter(|| detector.is_pose_colliding(&random_pose(&mut rng)));
    });
}

fn bench_segment_collision(c: &mut Criterion) {
    let detector = detector();
    let mut rng = StdRng::seed_from_u64(0);
    c.bench_function("bench_segment_collision", |b| {
        b.iter(|| {
            let from = random_pose(&mut rng);
            let to = random_pose(&mut rng);
            detector.is_segment_colliding(&from, &to)
        });
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(100);
    targets = bench_pose_collision, bench_segment_collision);
criterion_main!(benches);
