// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end file I/O against the desktop resolver and a temporary directory.

#![cfg(not(target_os = "android"))]

use std::path::Path;
use std::sync::Arc;

use contentbridge_bridge::desktop::LocalResolver;
use contentbridge_core::error::BridgeError;
use contentbridge_core::types::ResourceIdentifier;
use contentbridge_core::canonicalize;
use contentbridge_io::{FileIoService, TransferOptions};

fn service() -> FileIoService {
    FileIoService::new(Arc::new(LocalResolver::new()))
}

fn id_for(path: &Path) -> ResourceIdentifier {
    canonicalize(&format!("file://{}", path.display()))
}

#[test]
fn written_bytes_are_read_back_after_close() {
    let dir = tempfile::tempdir().expect("tempdir");
    let id = id_for(&dir.path().join("out.bin"));
    let svc = service();

    let payload: Vec<u8> = (0..10_000u32).map(|i| (i % 256) as u8).collect();
    let mut writer = svc.open_write(&id).expect("open write");
    for chunk in payload.chunks(999) {
        svc.write(&mut writer, chunk).expect("write");
    }
    svc.close_write(&mut writer).expect("close write");

    let mut reader = svc.open_read(&id).expect("open read");
    assert_eq!(svc.size(&reader).expect("size"), payload.len() as u64);
    let back = svc
        .read_to_end(&mut reader, TransferOptions::default())
        .expect("read back");
    svc.close_read(&mut reader).expect("close read");
    assert_eq!(back, payload);
}

#[test]
fn repeated_reads_sum_to_size() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("data.txt");
    std::fs::write(&path, vec![b'x'; 4321]).expect("write fixture");
    let svc = service();

    let mut reader = svc.open_read(&id_for(&path)).expect("open");
    let size = svc.size(&reader).expect("size");
    let mut total = 0u64;
    loop {
        let chunk = svc.read(&mut reader, 500).expect("read");
        assert!(chunk.len() <= 500);
        if chunk.is_empty() {
            break;
        }
        total += chunk.len() as u64;
    }
    assert_eq!(total, size);
    assert!(svc.read(&mut reader, 500).expect("read past end").is_empty());
}

#[test]
fn reset_rereads_from_the_start() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("song.txt");
    std::fs::write(&path, b"one two three").expect("write fixture");
    let svc = service();

    let mut reader = svc.open_read(&id_for(&path)).expect("open");
    let first = svc.read(&mut reader, 7).expect("read");
    svc.read(&mut reader, 100).expect("drain");
    svc.reset(&mut reader).expect("reset");
    assert_eq!(svc.read(&mut reader, 7).expect("read again"), first);
}

#[test]
fn canonical_form_resolves_like_the_raw_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let svc = service();

    for name in ["My Song.mp3", "100%.txt", "a+b (1).txt", "Caf\u{e9}.txt"] {
        let path = dir.path().join(name);
        std::fs::write(&path, name.as_bytes()).expect("write fixture");

        let raw = format!("file://{}", path.display());
        let once = canonicalize(&raw);
        let twice = canonicalize(once.as_str());
        assert_eq!(once, twice, "canonicalisation of {name} is idempotent");

        let mut reader = svc.open_read(&once).expect("canonical id resolves");
        let contents = svc
            .read_to_end(&mut reader, TransferOptions::default())
            .expect("read");
        assert_eq!(contents, name.as_bytes());

        assert_eq!(svc.display_name(&once).expect("display name"), name);
    }
}

#[test]
fn bare_path_with_escaped_directory_resolves() {
    let dir = tempfile::tempdir().expect("tempdir");
    let nested = dir.path().join("a%41b");
    std::fs::create_dir(&nested).expect("create dir");
    let path = nested.join("f g.txt");
    std::fs::write(&path, b"nested").expect("write fixture");
    let svc = service();

    let id = canonicalize(&path.to_string_lossy());
    let mut reader = svc.open_read(&id).expect("escaped directory resolves");
    let contents = svc
        .read_to_end(&mut reader, TransferOptions::default())
        .expect("read");
    assert_eq!(contents, b"nested");
    assert_eq!(svc.display_name(&id).expect("display name"), "f g.txt");
}

#[test]
fn copy_between_local_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let src = dir.path().join("src.bin");
    let dst = dir.path().join("dst.bin");
    let payload = vec![7u8; 200_000];
    std::fs::write(&src, &payload).expect("write fixture");

    let copied = service()
        .copy(
            &id_for(&src),
            &id_for(&dst),
            TransferOptions {
                chunk_size: 8192,
                max_empty_reads: 2,
            },
        )
        .expect("copy");

    assert_eq!(copied, payload.len() as u64);
    assert_eq!(std::fs::read(&dst).expect("read copy"), payload);
}

#[test]
fn missing_file_and_missing_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    let id = id_for(&dir.path().join("absent.txt"));
    let svc = service();

    assert!(matches!(
        svc.open_read(&id),
        Err(BridgeError::ResourceNotFound(_))
    ));
    assert_eq!(svc.display_name(&id).expect("display name"), "");
}

#[test]
fn closed_handles_are_final() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("f.txt");
    std::fs::write(&path, b"abc").expect("write fixture");
    let svc = service();

    let mut reader = svc.open_read(&id_for(&path)).expect("open");
    svc.close_read(&mut reader).expect("close");
    assert!(matches!(svc.read(&mut reader, 1), Err(BridgeError::InvalidHandle(_))));
    assert!(matches!(svc.size(&reader), Err(BridgeError::InvalidHandle(_))));
    assert!(matches!(svc.reset(&mut reader), Err(BridgeError::InvalidHandle(_))));

    let mut writer = svc.open_write(&id_for(&dir.path().join("g.txt"))).expect("open write");
    svc.close_write(&mut writer).expect("close");
    assert!(matches!(svc.write(&mut writer, b"x"), Err(BridgeError::InvalidHandle(_))));
}
