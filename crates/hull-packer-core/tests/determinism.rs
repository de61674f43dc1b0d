use hull_packer_core::config::{PackingConfig, PackingQuality, PackingStyle};
use hull_packer_core::model::{Point, SpriteBatch};
use hull_packer_core::{pack_placements, pack_sprites};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

// Star-ish fan meshes: a centre vertex plus a ring of jittered spokes.
fn gen_silhouettes(seed: u64, count: usize) -> SpriteBatch {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut batch = SpriteBatch::new();
    for i in 0..count {
        let spokes = rng.gen_range(5..12usize);
        let radius = rng.gen_range(6.0..28.0f32);
        let mut verts = vec![Point::new(radius, radius)];
        for s in 0..spokes {
            let a = s as f32 / spokes as f32 * TAU;
            let r = radius * rng.gen_range(0.4..1.0f32);
            verts.push(Point::new(radius + a.cos() * r, radius + a.sin() * r));
        }
        let mut indices = Vec::new();
        for s in 0..spokes as u32 {
            indices.extend_from_slice(&[0, 1 + s, 1 + (s + 1) % spokes as u32]);
        }
        let size = (radius * 2.0).ceil() as u32;
        batch.push(format!("s{}", i), &verts, &indices, size, size);
    }
    batch
}

fn base_cfg(style: PackingStyle) -> PackingConfig {
    PackingConfig::builder()
        .padding(2)
        .max_texture_size(256)
        .quality(PackingQuality::High)
        .style(style)
        .build()
}

#[test]
fn same_input_same_placements() {
    let batch = gen_silhouettes(7, 40);
    let cfg = base_cfg(PackingStyle::Default);
    let a = pack_placements(&batch, &cfg);
    let b = pack_placements(&batch, &cfg);
    assert_eq!(a, b);
    assert!(a.iter().all(|p| !p.is_failed()));
}

#[test]
fn shard_count_and_threading_do_not_change_results() {
    for style in [PackingStyle::Default, PackingStyle::Ramp, PackingStyle::Square] {
        let batch = gen_silhouettes(99, 30);
        let reference = pack_placements(
            &batch,
            &PackingConfig {
                parallel: false,
                shard_count: Some(1),
                ..base_cfg(style)
            },
        );
        for shards in [Some(1), Some(3), Some(7), None] {
            for parallel in [false, true] {
                let cfg = PackingConfig {
                    parallel,
                    shard_count: shards,
                    ..base_cfg(style)
                };
                assert_eq!(
                    pack_placements(&batch, &cfg),
                    reference,
                    "{:?} shards={:?} parallel={}",
                    style,
                    shards,
                    parallel
                );
            }
        }
    }
}

#[test]
fn seed_does_not_change_placements() {
    let batch = gen_silhouettes(3, 25);
    let a = pack_placements(&batch, &base_cfg(PackingStyle::Square));
    let b = pack_placements(
        &batch,
        &PackingConfig {
            seed: 12345,
            ..base_cfg(PackingStyle::Square)
        },
    );
    assert_eq!(a, b);
}

#[test]
fn seed_does_not_change_placements_with_tied_pivots() {
    let verts = [
        Point::new(0.0, 0.0),
        Point::new(40.0, 0.0),
        Point::new(40.0, 20.0),
        Point::new(0.0, 20.0),
        Point::new(20.0, 20.0),
    ];
    let indices = [0, 1, 2, 0, 2, 3];
    let mut batch = SpriteBatch::new();
    for i in 0..12 {
        batch.push(format!("r{}", i), &verts, &indices, 40, 20);
    }
    let cfg = |seed: u64| {
        PackingConfig::builder()
            .padding(32)
            .max_texture_size(512)
            .seed(seed)
            .build()
    };
    let reference = pack_placements(&batch, &cfg(0));
    assert!(reference.iter().all(|p| !p.is_failed()));
    for seed in 1..16 {
        assert_eq!(pack_placements(&batch, &cfg(seed)), reference, "seed {}", seed);
    }
}

#[test]
fn packed_hulls_never_overlap_and_stay_in_bounds() {
    for (seed, style) in [
        (1u64, PackingStyle::Default),
        (2, PackingStyle::Ramp),
        (3, PackingStyle::Square),
    ] {
        let batch = gen_silhouettes(seed, 60);
        let cfg = base_cfg(style);
        let out = pack_sprites(&batch, &cfg).unwrap();
        out.validate().unwrap();

        for page in &out.pages {
            assert!(page.width() <= cfg.max_texture_size);
            assert!(page.height() <= cfg.max_texture_size);
            let (uw, uh) = page.used_size();
            assert!(uw <= cfg.max_texture_size && uh <= cfg.max_texture_size);
        }
        for (p, hull) in out.placements.iter().zip(&out.hulls) {
            assert!(p.x >= 0 && p.y >= 0 && p.page >= 0);
            assert_eq!(p.x as u32 % cfg.granularity(), 0);
            assert_eq!(p.y as u32 % cfg.granularity(), 0);
            let page = &out.pages[p.page as usize];
            assert!(p.x as f32 + hull.width <= page.width() as f32);
            assert!(p.y as f32 + hull.height <= page.height() as f32);
        }
    }
}
