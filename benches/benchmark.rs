//! パフォーマンスベンチマーク
//!
//! 1行分のコンテキスト構築と、テンプレートへの差し込みの速度を測定します。
//! バッチ全体の時間はおおむね「行数 × 差し込み1回」になります。

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::io::{Cursor, Write};
use xlsxmerge::{map_row, transliterate, DateStyle, DocumentProfile, DocxTemplate};
use zip::write::{FileOptions, ZipWriter};

/// 全フィールドのプレースホルダーを含む.docxを作成
fn generate_template(fields: &[String], paragraphs: usize) -> Vec<u8> {
    let mut body = String::new();
    for i in 0..paragraphs {
        let field = &fields[i % fields.len()];
        // 一部のプレースホルダーはランをまたいで分割する
        if i % 3 == 0 {
            body.push_str(&format!(
                r#"<w:p><w:r><w:t>{{</w:t></w:r><w:r><w:t>{{ {} }}}}</w:t></w:r></w:p>"#,
                field
            ));
        } else {
            body.push_str(&format!(
                r#"<w:p><w:r><w:t xml:space="preserve">{}: {{{{ {} }}}}</w:t></w:r></w:p>"#,
                field, field
            ));
        }
    }
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("word/document.xml", FileOptions::default())
        .unwrap();
    zip.write_all(document.as_bytes()).unwrap();
    zip.start_file("word/media/image1.png", FileOptions::default())
        .unwrap();
    zip.write_all(&vec![0u8; 64 * 1024]).unwrap();
    zip.finish().unwrap().into_inner()
}

fn transcript_row(width: usize) -> Vec<String> {
    (0..width).map(|i| format!("{}", 60 + i % 40)).collect()
}

fn benchmark_map_row(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
    let transcript = DocumentProfile::transcript();
    let degree = DocumentProfile::degree();
    let transcript_values = transcript_row(transcript.fields.len());
    let degree_values = transcript_row(degree.fields.len());

    let mut group = c.benchmark_group("map_row");
    group.bench_function("transcript", |b| {
        b.iter(|| {
            map_row(
                black_box(&transcript.fields),
                black_box(&transcript_values),
                &transcript.transliterate,
                &transcript.date_style,
                today,
            )
        });
    });
    group.bench_function("degree_with_khmer_digits", |b| {
        b.iter(|| {
            map_row(
                black_box(&degree.fields),
                black_box(&degree_values),
                &degree.transliterate,
                &degree.date_style,
                today,
            )
        });
    });
    group.finish();

    c.bench_function("transliterate", |b| {
        b.iter(|| transliterate(black_box("ID 2024-0815, born 01-02-2003")));
    });
}

fn benchmark_render(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
    let profile = DocumentProfile::transcript();
    let values = transcript_row(profile.fields.len());
    let context = map_row(
        &profile.fields,
        &values,
        &profile.transliterate,
        &profile.date_style,
        today,
    );

    let mut group = c.benchmark_group("render");
    for paragraphs in [51usize, 500] {
        let bytes = generate_template(&profile.fields, paragraphs);
        let template = DocxTemplate::from_reader(Cursor::new(bytes.clone())).unwrap();

        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_function(format!("transcript_{}_paragraphs", paragraphs), |b| {
            b.iter(|| template.render(black_box(&context)).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_map_row, benchmark_render);
criterion_main!(benches);
