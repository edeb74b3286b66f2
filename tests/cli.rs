use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn write_wav(path: &Path, channels: u16, sample_rate: u32, bits: u16, frames: usize) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: bits,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..frames * channels as usize {
        let v = ((i as f32) * 0.02).sin() * 0.25;
        if bits == 16 {
            writer.write_sample((v * 32767.0) as i16).unwrap();
        } else {
            writer.write_sample((v * 8388607.0) as i32).unwrap();
        }
    }
    writer.finalize().unwrap();
}

fn spconverter() -> Command {
    let mut cmd = Command::cargo_bin("spconverter").unwrap();
    cmd.arg("--fast-resample");
    cmd
}

#[test]
fn test_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    spconverter()
        .arg(dir.path().join("nope"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"))
        .stdout(predicate::str::contains("Execution Time"));
}

#[test]
fn test_single_file_conversion() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("track.wav");
    write_wav(&source, 1, 44100, 24, 4410);

    spconverter()
        .arg(&source)
        .assert()
        .success()
        .stdout(predicate::str::contains("Processing [1/1]"))
        .stdout(predicate::str::contains("1 converted"));

    let reader = hound::WavReader::open(dir.path().join("track-SPC.wav")).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.sample_rate, 48000);
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.bits_per_sample, 16);
}

#[test]
fn test_single_file_pcm16_copy() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("track.wav");
    write_wav(&source, 1, 22050, 16, 2205);

    spconverter().arg(&source).assert().success();

    let copied = std::fs::read(dir.path().join("track-SPC.wav")).unwrap();
    assert_eq!(copied, std::fs::read(&source).unwrap());
}

#[test]
fn test_directory_mirroring() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("album");
    write_wav(&root.join("a.wav"), 2, 44100, 24, 1000);
    write_wav(&root.join("disc2").join("b.wav"), 2, 96000, 24, 1000);
    std::fs::write(root.join("notes.txt"), "liner notes").unwrap();

    spconverter()
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("Processing [1/2]"))
        .stdout(predicate::str::contains("Processing [2/2]"))
        .stdout(predicate::str::contains("2 converted"));

    let mirror = dir.path().join("album-SPC");
    assert!(mirror.join("a.wav").is_file());
    assert!(mirror.join("disc2").join("b.wav").is_file());
    assert!(!mirror.join("notes.txt").exists());
}

#[test]
fn test_failed_file_sets_exit_code() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("album");
    write_wav(&root.join("good.wav"), 2, 44100, 24, 1000);
    std::fs::write(root.join("bad.flac"), "not a flac stream").unwrap();

    spconverter()
        .arg(&root)
        .assert()
        .failure()
        .stdout(predicate::str::contains("1 failed [open 1]"))
        .stderr(predicate::str::contains("bad.flac"));

    assert!(dir.path().join("album-SPC").join("good.wav").is_file());
    assert!(!dir.path().join("album-SPC").join("bad.flac").exists());
}

#[test]
fn test_unlisted_single_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("notes.txt");
    std::fs::write(&source, "text").unwrap();

    spconverter()
        .arg(&source)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported input"));
}
