use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const UTM10_PRJ: &str = r#"PROJCS["NAD_1983_UTM_Zone_10N",GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137.0,298.257222101]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"],UNIT["Meter",1.0]]"#;

fn write_shp(path: &Path, shape_code: i32) {
    let mut header = vec![0u8; 100];
    header[0..4].copy_from_slice(&9994i32.to_be_bytes());
    header[24..28].copy_from_slice(&50i32.to_be_bytes());
    header[28..32].copy_from_slice(&1000i32.to_le_bytes());
    header[32..36].copy_from_slice(&shape_code.to_le_bytes());
    fs::write(path, header).unwrap();
}

/// Binary with HOME pointed somewhere empty so no user config leaks in.
fn inventory_cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("data_inventory").unwrap();
    cmd.env("HOME", home).env("RUST_LOG", "info");
    cmd
}

#[test]
fn test_help_command() {
    let home = TempDir::new().unwrap();
    inventory_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Inventory file geodatabases and shapefiles",
        ))
        .stdout(predicate::str::contains("--output-dir"));
}

#[test]
fn test_directory_mode_through_prompts() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let data = work.path().join("data");
    fs::create_dir(&data).unwrap();
    write_shp(&data.join("roads.shp"), 3);
    fs::write(data.join("roads.prj"), UTM10_PRJ).unwrap();
    write_shp(&data.join("wells.shp"), 1);
    fs::write(data.join("readme.txt"), "not a dataset").unwrap();
    let out = work.path().join("reports").join("2024");

    inventory_cmd(home.path())
        .write_stdin(format!("directory\n{}\n{}\n", data.display(), out.display()))
        .assert()
        .success()
        .stdout(predicate::str::contains("[csv|directory]"))
        .stdout(predicate::str::contains("INPUT ERROR").not());

    let text = fs::read_to_string(out.join("data_inventory.csv")).unwrap();
    assert_eq!(
        text,
        format!(
            "path,spatialReference,shapeType\n{},NAD_1983_UTM_Zone_10N,Polyline\n{},NONE,Point\n",
            data.join("roads.shp").display(),
            data.join("wells.shp").display()
        )
    );
}

#[test]
fn test_csv_mode_from_flags_with_missing_datasets() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let shp = work.path().join("parcels.shp");
    write_shp(&shp, 5);
    let gone_gdb = work.path().join("archive.gdb");
    let gone_shp = work.path().join("old.shp");

    let list = work.path().join("paths.csv");
    fs::write(
        &list,
        format!(
            "path\n{}\n{}\n{}\n",
            gone_gdb.display(),
            shp.display(),
            gone_shp.display()
        ),
    )
    .unwrap();

    inventory_cmd(home.path())
        .args(["--mode", "csv", "--extended", "--output-name", "inv.csv"])
        .arg("--input")
        .arg(&list)
        .arg("--output-dir")
        .arg(work.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("does not exist"));

    let text = fs::read_to_string(work.path().join("inv.csv")).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "path,spatialReference,featureType,shapeType,shapeFieldName".to_string(),
            format!(
                "{},ERROR: PATH NOT FOUND,ERROR: PATH NOT FOUND,ERROR: PATH NOT FOUND,ERROR: PATH NOT FOUND",
                gone_gdb.display()
            ),
            format!("{},NONE,Simple,Polygon,Shape", shp.display()),
            format!(
                "{},ERROR: PATH NOT FOUND,ERROR: PATH NOT FOUND,ERROR: PATH NOT FOUND,ERROR: PATH NOT FOUND",
                gone_shp.display()
            ),
        ]
    );
}

#[test]
fn test_invalid_mode_gives_up() {
    let home = TempDir::new().unwrap();
    inventory_cmd(home.path())
        .write_stdin("folder\nfiles\nlist\nscan\nboth\n")
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "INPUT ERROR: Input 'folder' does not match any of valid options [csv|directory]",
        ))
        .stderr(predicate::str::contains("No valid input mode after 5 attempts"));
}

#[test]
fn test_missing_csv_input_fails() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let out = work.path().join("out");

    inventory_cmd(home.path())
        .arg("--output-dir")
        .arg(&out)
        .write_stdin(format!("csv\n{}\n", work.path().join("absent.csv").display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.csv"));

    assert!(!out.exists());
}

#[test]
fn test_fatal_error_printed_with_logging_off() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();

    inventory_cmd(home.path())
        .env("RUST_LOG", "off")
        .write_stdin(format!(
            "csv\n{}\n\n",
            work.path().join("absent.csv").display()
        ))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Failed to open path list"))
        .stderr(predicate::str::contains("absent.csv"));
}

#[test]
fn test_config_file_supplies_output_name() {
    let home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let data = work.path().join("data");
    fs::create_dir(&data).unwrap();
    write_shp(&data.join("lakes.shp"), 15);

    let config = work.path().join("inventory.toml");
    fs::write(&config, "output_name = \"from_config.csv\"\npatterns = [\"*.shp\"]\n").unwrap();

    inventory_cmd(home.path())
        .arg("--config")
        .arg(&config)
        .args(["--mode", "directory"])
        .arg("--input")
        .arg(&data)
        .arg("--output-dir")
        .arg(work.path())
        .assert()
        .success();

    let text = fs::read_to_string(work.path().join("from_config.csv")).unwrap();
    assert!(text.ends_with("lakes.shp,NONE,Polygon\n"));
}
