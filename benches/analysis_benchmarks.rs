use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use gcode_estimator::{PrinterConfig, analyze};

/// Generate G-code content of different patterns for benchmarking
fn generate_gcode_content(lines: usize, pattern: &str) -> String {
    let mut content = String::new();

    match pattern {
        "print_heavy" => {
            content.push_str("M83\nG90\n");
            for i in 0..lines {
                content.push_str(&format!(
                    "G1 X{:.3} Y{:.3} E{:.4} F1500\n",
                    (i % 200) as f32 * 0.5,
                    (i / 200) as f32 * 0.5,
                    0.033
                ));
            }
        }
        "layered" => {
            content.push_str("M83\nG90\n");
            for i in 0..lines {
                match i % 50 {
                    0 => content.push_str(&format!(";LAYER:{}\n", i / 50)),
                    1 => content.push_str(&format!("G1 Z{:.2} F600\n", (i / 50 + 1) as f32 * 0.2)),
                    _ => content.push_str(&format!(
                        "G1 X{:.2} Y{:.2} E0.03 F1800\n",
                        (i % 50) as f32,
                        (i / 50) as f32
                    )),
                }
            }
        }
        "comment_heavy" => {
            for i in 0..lines {
                if i % 2 == 0 {
                    content.push_str(&format!("; segment {} of the outer wall\n", i));
                } else {
                    content.push_str(&format!("G1 X{:.1} Y{:.1} F1500\n", i as f32, i as f32));
                }
            }
        }
        _ => {
            for i in 0..lines {
                content.push_str(&format!("G1 X{} Y{} F1500\n", i % 100, i % 100));
            }
        }
    }

    content
}

fn bench_analysis_patterns(c: &mut Criterion) {
    let config = PrinterConfig::default();
    let mut group = c.benchmark_group("analysis_patterns");

    for pattern in ["print_heavy", "layered", "comment_heavy"] {
        let content = generate_gcode_content(10_000, pattern);
        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(pattern),
            &content,
            |b, content| b.iter(|| analyze(black_box(content.lines()), &config)),
        );
    }

    group.finish();
}

fn bench_analysis_scaling(c: &mut Criterion) {
    let config = PrinterConfig::default();
    let mut group = c.benchmark_group("analysis_scaling");

    for lines in [1_000, 10_000, 100_000] {
        let content = generate_gcode_content(lines, "layered");
        group.throughput(Throughput::Elements(lines as u64));
        group.bench_with_input(BenchmarkId::from_parameter(lines), &content, |b, content| {
            b.iter(|| analyze(black_box(content.lines()), &config))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_analysis_patterns, bench_analysis_scaling);
criterion_main!(benches);
