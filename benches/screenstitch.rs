use criterion::{criterion_group, criterion_main, Criterion};
use screenstitch::{
    find_offset, find_overlap, mip, overlap_score, Arena, NoopObserver, StitchConfig,
};
use std::hint::black_box;

fn make_screen(width: usize, height: usize) -> Vec<u32> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            // Text-like rows of small glyph blocks on a light background.
            let glyph = (x / 6) * 31 + (y / 12) * 17;
            let lit = (glyph.wrapping_mul(2_654_435_761) >> 7) & 3 != 0;
            let ink = (y % 12) < 8 && (x % 6) < 4 && lit;
            let value = if ink {
                0xFF00_0000 | ((glyph as u32).wrapping_mul(0x0013_5791) & 0x007F_7F7F)
            } else {
                0xFFF4_F4F4
            };
            data.push(value);
        }
    }
    data
}

fn crop(scene: &[u32], scene_width: usize, x0: usize, y0: usize, w: usize, h: usize) -> Vec<u32> {
    let mut out = Vec::with_capacity(w * h);
    for y in y0..y0 + h {
        out.extend_from_slice(&scene[y * scene_width + x0..y * scene_width + x0 + w]);
    }
    out
}

fn bench_stitch(c: &mut Criterion) {
    let scene_width = 960;
    let scene_height = 720;
    let scene = make_screen(scene_width, scene_height);
    let (w, h) = (640, 480);
    let a_px = crop(&scene, scene_width, 0, 0, w, h);
    let b_px = crop(&scene, scene_width, 192, 144, w, h);

    let mut arena = Arena::new();
    let a = arena.image_from_pixels(w, h, &a_px).unwrap();
    let b = arena.image_from_pixels(w, h, &b_px).unwrap();
    let config = StitchConfig::default();

    c.bench_function("overlap_score_full_res", |bench| {
        bench.iter(|| black_box(overlap_score(&arena, &a, &b, 192, 144)));
    });

    c.bench_function("mip_640x480", |bench| {
        bench.iter(|| {
            let mut scope = arena.guard();
            black_box(mip(&mut scope, &a).unwrap())
        });
    });

    c.bench_function("find_offset_640x480", |bench| {
        bench.iter(|| {
            black_box(find_offset(&mut arena, &a, &b, &config, &mut NoopObserver).unwrap())
        });
    });

    c.bench_function("find_overlap_640x480", |bench| {
        bench.iter(|| {
            let mut scope = arena.guard();
            let stitch = find_overlap(&mut scope, &a, &b, &config, &mut NoopObserver).unwrap();
            black_box(stitch.offset_x)
        });
    });
}

criterion_group!(benches, bench_stitch);
criterion_main!(benches);
