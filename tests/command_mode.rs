//! Integration tests for the command-line front end

use std::process::Command;

fn run_command(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .arg("run")
        .arg("-q")
        .arg("--")
        // Tests must be deterministic and not depend on a user's ~/.config/crcgrid/settings.toml.
        .arg("--no-settings")
        .args(args)
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn temp_path(stem: &str, ext: &str) -> String {
    std::env::temp_dir()
        .join(format!("crcgrid_cli_{}_{}.{}", stem, std::process::id(), ext))
        .to_string_lossy()
        .to_string()
}

const READ_REGISTERS: &[&str] = &[
    "-s", "B0101=01", "-s", "B0102=03", "-s", "B0103=00", "-s", "B0104=00", "-s",
    "B0105=00", "-s", "B0106=0A",
];

#[test]
fn test_formula_arithmetic() {
    let (stdout, _, code) = run_command(&["-c", "B0106+0XFF*2"]);
    assert_eq!(stdout.trim(), "FE");
    assert_eq!(code, 0);
}

#[test]
fn test_high_and_low_extraction() {
    let (stdout, _, _) = run_command(&["-c", "#(0X1234)"]);
    assert_eq!(stdout.trim(), "12");
    let (stdout, _, _) = run_command(&["-c", "$(0X1234)"]);
    assert_eq!(stdout.trim(), "34");
}

#[test]
fn test_negative_result_masks_to_byte() {
    let (stdout, _, code) = run_command(&["-c", "-1+0"]);
    assert_eq!(stdout.trim(), "FF");
    assert_eq!(code, 0);
}

#[test]
fn test_division_rounds_half_to_even() {
    let (stdout, _, _) = run_command(&["-c", "5/2"]);
    assert_eq!(stdout.trim(), "02");
    let (stdout, _, _) = run_command(&["-c", "7/2"]);
    assert_eq!(stdout.trim(), "04");
}

#[test]
fn test_division_by_zero() {
    let (stdout, _, code) = run_command(&["-c", "1/0"]);
    assert!(stdout.starts_with("#ERR"));
    assert_eq!(code, 1);
}

#[test]
fn test_hex_byte_text() {
    let (stdout, _, code) = run_command(&["-c", "0a"]);
    assert_eq!(stdout.trim(), "0A");
    assert_eq!(code, 0);
}

#[test]
fn test_command_sees_set_cells() {
    let (stdout, _, code) = run_command(&["-s", "B0101=7", "--explain", "-c", "$(B0101*3+0X20)"]);
    assert_eq!(stdout.trim(), "53\n35");
    assert_eq!(code, 0);
}

#[test]
fn test_rows_with_crc() {
    let (stdout, _, code) = run_command(READ_REGISTERS);
    assert_eq!(stdout.trim(), "R01 CRC=C5CD  01 03 00 00 00 0A C5 CD");
    assert_eq!(code, 0);
}

#[test]
fn test_rows_high_first_compact() {
    let mut args = READ_REGISTERS.to_vec();
    args.extend(["--order", "high_first", "--compact"]);
    let (stdout, _, code) = run_command(&args);
    assert_eq!(stdout.trim(), "R01 CRC=CDC5  01030000000ACDC5");
    assert_eq!(code, 0);
}

#[test]
fn test_unsettled_values_warn() {
    let (stdout, stderr, code) = run_command(&[
        "--hex-cols",
        "2",
        "-s",
        "B0101=B0102+1",
        "-s",
        "B0102=B0101+1",
    ]);
    assert_eq!(stdout.trim(), "R01 CRC=87E7  09 0A 87 E7");
    assert!(stderr.contains("did not settle"));
    assert_eq!(code, 0);
}

#[test]
fn test_cell_outside_grid_is_an_error() {
    let (_, stderr, code) = run_command(&["-s", "B0107=01"]);
    assert!(stderr.contains("B0107"));
    assert_eq!(code, 1);
}

#[test]
fn test_unknown_option() {
    let (_, stderr, code) = run_command(&["--frobnicate"]);
    assert!(stderr.contains("Unknown option"));
    assert_eq!(code, 1);
}

#[test]
fn test_load_saved_configuration() {
    use std::fs;

    let config_file = temp_path("load", "json");
    fs::write(
        &config_file,
        r#"{
  "global_params": {"total_rows": 1, "dec_col_count": 1, "hex_col_count": 2, "crc_order": "高位在前"},
  "raw_text_dict": {"A0101": "1", "B0101": "A0101", "B0102": "02", "B0199": "FF"}
}"#,
    )
    .unwrap();

    let (stdout, stderr, code) = run_command(&[config_file.as_str()]);
    assert_eq!(stdout.trim(), "R01 CRC=E181  01 02 E1 81");
    assert!(stderr.contains("B0199"));
    assert_eq!(code, 0);

    fs::remove_file(&config_file).ok();
}

#[test]
fn test_save_as_then_reload() {
    use std::fs;

    let config_file = temp_path("save_as", "json");
    let mut args = READ_REGISTERS.to_vec();
    args.extend(["--save-as", config_file.as_str()]);
    let (_, stderr, code) = run_command(&args);
    assert_eq!(code, 0);
    assert!(stderr.contains("Saved to"));

    let content = fs::read_to_string(&config_file).unwrap();
    assert!(content.contains("\"global_params\""));
    assert!(content.contains("\"B0106\": \"0A\""));

    let (stdout, _, code) = run_command(&[config_file.as_str()]);
    assert_eq!(stdout.trim(), "R01 CRC=C5CD  01 03 00 00 00 0A C5 CD");
    assert_eq!(code, 0);

    fs::remove_file(&config_file).ok();
}

#[test]
fn test_markdown_report_output() {
    use std::fs;

    let output_file = temp_path("report", "md");
    let mut args = READ_REGISTERS.to_vec();
    args.extend(["-o", output_file.as_str()]);
    let (_, stderr, code) = run_command(&args);
    assert_eq!(code, 0);
    assert!(stderr.contains("Exported to"));

    let content = fs::read_to_string(&output_file).unwrap();
    assert!(content.contains("| 1 | 01 03 00 00 00 0A | C5CD | 01 03 00 00 00 0A C5 CD |"));

    fs::remove_file(&output_file).ok();
}
