use predicates::prelude::*; // Used for writing assertions
use assert_cmd::Command; // Run programs
use std::path::PathBuf;
use d64kit::img::d64::{IMAGE_SIZE,SECTOR_SIZE,locate};

fn offset(track: u8,sector: u8) -> usize {
    locate(track,sector).expect("bad test geometry")*SECTOR_SIZE
}

/// Disk named DEMOS with HELLO (PRG, 3 bytes at 17/0) and a locked,
/// unclosed SEQ called LOG; 68 blocks free
fn build_disk() -> Vec<u8> {
    let mut dat = vec![0;IMAGE_SIZE];
    let h = offset(18,0);
    dat[h] = 18;
    dat[h+1] = 1;
    dat[h+2] = 0x41;
    for track in 1..=35usize {
        if track!=18 {
            dat[h+track*4] = 2;
        }
    }
    dat[h+144..h+167].fill(0xa0);
    dat[h+144..h+149].copy_from_slice(b"DEMOS");
    dat[h+162..h+164].copy_from_slice(b"7X");
    dat[h+165..h+167].copy_from_slice(b"2A");
    let d = offset(18,1);
    dat[d+1] = 0xff;
    dat[d+2] = 0x82;
    dat[d+3] = 17;
    dat[d+5..d+21].fill(0xa0);
    dat[d+5..d+10].copy_from_slice(b"HELLO");
    dat[d+30] = 1;
    dat[d+32+2] = 0x41;
    dat[d+32+3] = 19;
    dat[d+32+5..d+32+21].fill(0xa0);
    dat[d+32+5..d+32+8].copy_from_slice(b"LOG");
    dat[d+32+30] = 12;
    let a = offset(17,0);
    dat[a+1] = 4;
    dat[a+2..a+5].copy_from_slice(&[0x01,0x08,0x60]);
    dat
}

fn write_disk(dir: &tempfile::TempDir,name: &str,dat: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path,dat).expect("could not write test image");
    path
}

fn listing(upper: bool) -> String {
    let (hello,log,free) = match upper {
        true => ("PRG ","*SEQ<","BLOCKS FREE."),
        false => ("prg ","*seq<","blocks free.")
    };
    let header = match upper {
        true => "0 \"DEMOS           \" 7X 2A",
        false => "0 \"demos           \" 7x 2a"
    };
    let (hello_name,log_name) = match upper {
        true => ("HELLO","LOG"),
        false => ("hello","log")
    };
    format!("\n{}\n1    \"{}\"{}{}\n12   \"{}\"{}{}\n68 {}\n\n",
        header,hello_name," ".repeat(12),hello,log_name," ".repeat(13),log,free)
}

#[test]
fn list_one_image() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = write_disk(&dir,"demos.d64",&build_disk());
    let mut cmd = Command::cargo_bin("d64list")?;
    cmd.arg(&path)
        .assert()
        .success()
        .stdout(listing(true));
    Ok(())
}

#[test]
fn lowercase_with_names() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = write_disk(&dir,"demos.d64",&build_disk());
    let mut cmd = Command::cargo_bin("d64list")?;
    let expected = format!("\n{}:\n{}",path.display(),&listing(false)[1..]);
    cmd.arg("-lf").arg(&path)
        .assert()
        .success()
        .stdout(expected);
    Ok(())
}

#[test]
fn list_from_stdin() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("d64list")?;
    cmd.write_stdin(build_disk())
        .assert()
        .success()
        .stdout(listing(true));
    Ok(())
}

#[test]
fn bad_sizes_are_skipped() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let small = write_disk(&dir,"small.d64",&vec![0;1000]);
    let mut big_dat = build_disk();
    big_dat.push(0);
    let big = write_disk(&dir,"big.d64",&big_dat);
    let good = write_disk(&dir,"good.d64",&build_disk());
    let mut cmd = Command::cargo_bin("d64list")?;
    cmd.arg(&small).arg(&big).arg(dir.path().join("missing.d64")).arg(&good)
        .assert()
        .failure()
        .stdout(listing(true))
        .stderr(predicate::str::contains("(too small for a .D64 file)"))
        .stderr(predicate::str::contains("(too big for a .D64 file)"))
        .stderr(predicate::str::contains("cannot open"));
    Ok(())
}

#[test]
fn short_stdin() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("d64list")?;
    cmd.write_stdin(vec![0;IMAGE_SIZE-1])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error reading stdin (too small for a .D64 file)"));
    Ok(())
}

#[test]
fn help_is_failure() -> Result<(), Box<dyn std::error::Error>> {
    for flag in ["-h","-?"] {
        let mut cmd = Command::cargo_bin("d64list")?;
        cmd.arg(flag)
            .assert()
            .failure()
            .stdout(predicate::str::contains("Usage"))
            .stdout(predicate::str::contains("use lowercase charset"))
            .stdout(predicate::str::contains("rather than the terminal"));
    }
    Ok(())
}

#[test]
fn unknown_flag() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("d64list")?;
    cmd.arg("-x")
        .assert()
        .failure()
        .stderr(predicate::str::contains("-x"));
    Ok(())
}

#[test]
fn copy_with_default_name() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = write_disk(&dir,"demos.d64",&build_disk());
    let mut cmd = Command::cargo_bin("d64list")?;
    cmd.current_dir(dir.path())
        .arg("-c").arg(&path)
        .write_stdin("yes\ny\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"HELLO\"            PRG  (y/n) (y/n)Destination (Hello.prg):12   \"LOG\""));
    assert_eq!(std::fs::read(dir.path().join("Hello.prg"))?,vec![0x01,0x08,0x60]);
    Ok(())
}

#[test]
fn copy_without_extension() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = write_disk(&dir,"demos.d64",&build_disk());
    let mut cmd = Command::cargo_bin("d64list")?;
    cmd.current_dir(dir.path())
        .arg("-ce").arg(&path)
        .write_stdin("y\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Destination (Hello):"));
    assert!(dir.path().join("Hello").exists());
    Ok(())
}

#[test]
fn json_catalog() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = write_disk(&dir,"demos.d64",&build_disk());
    let mut cmd = Command::cargo_bin("d64list")?;
    cmd.arg("-j").arg("--indent").arg("2").arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"blocks_free\": 68"))
        .stdout(predicate::str::contains("\"name\": \"HELLO\""));
    Ok(())
}

#[test]
fn geometry_fault_is_fatal() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut bad = build_disk();
    bad[offset(18,1)] = 40;
    let bad = write_disk(&dir,"bad.d64",&bad);
    let good = write_disk(&dir,"good.d64",&build_disk());
    let mut cmd = Command::cargo_bin("d64list")?;
    cmd.arg(&bad).arg(&good)
        .assert()
        .failure()
        .stdout(predicate::str::contains("DEMOS").not())
        .stderr(predicate::str::contains("67,ILLEGAL TRACK OR SECTOR,40,255"));
    Ok(())
}
