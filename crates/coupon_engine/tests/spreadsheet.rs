use std::io::Write;

use coupon_engine::{load_first_column, read_first_column, SheetError};
use pretty_assertions::assert_eq;
use rust_xlsxwriter::Workbook;

fn xlsx(build: impl FnOnce(&mut Workbook)) -> Vec<u8> {
    let mut workbook = Workbook::new();
    build(&mut workbook);
    workbook.save_to_buffer().expect("xlsx buffer")
}

#[test]
fn xlsx_first_sheet_first_column() {
    let bytes = xlsx(|workbook| {
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "010-1234-5678").unwrap();
        sheet.write_string(0, 1, "Kim").unwrap();
        sheet.write_string(2, 0, "0161234567").unwrap();
        sheet.write_number(3, 0, 1012345678.0).unwrap();
        let other = workbook.add_worksheet();
        other.write_string(0, 0, "ignored").unwrap();
    });

    let cells = read_first_column(&bytes, "recipients.xlsx").unwrap();
    assert_eq!(cells, vec!["010-1234-5678", "", "0161234567", "1012345678"]);
}

#[test]
fn leading_blank_rows_keep_row_positions() {
    let bytes = xlsx(|workbook| {
        let sheet = workbook.add_worksheet();
        sheet.write_string(2, 0, "01012345678").unwrap();
    });

    let cells = read_first_column(&bytes, "late.xlsx").unwrap();
    assert_eq!(cells, vec!["", "", "01012345678"]);
}

#[test]
fn data_outside_column_a_reads_as_blank() {
    let bytes = xlsx(|workbook| {
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 1, "01012345678").unwrap();
        sheet.write_string(1, 2, "0161234567").unwrap();
    });

    let cells = read_first_column(&bytes, "shifted.xlsx").unwrap();
    assert_eq!(cells, vec!["", ""]);
}

#[test]
fn empty_sheet_has_no_rows() {
    let bytes = xlsx(|workbook| {
        workbook.add_worksheet();
    });
    assert!(read_first_column(&bytes, "empty.xlsx").unwrap().is_empty());
}

#[test]
fn euc_kr_csv_is_decoded() {
    let header = "수신자 휴대폰 번호 목록입니다";
    let text = format!("{header},고객 이름과 메모는 무시합니다\n010-1234-5678,김민수 고객님\n");
    let (bytes, _, had_errors) = encoding_rs::EUC_KR.encode(&text);
    assert!(!had_errors);

    let cells = read_first_column(&bytes, "legacy.csv").unwrap();
    assert_eq!(cells, vec![header, "010-1234-5678"]);
}

#[test]
fn loads_from_disk() {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("temp file");
    file.write_all(b"01012345678\n0161234567\n").unwrap();

    let cells = load_first_column(file.path()).unwrap();
    assert_eq!(cells, vec!["01012345678", "0161234567"]);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_first_column(&dir.path().join("gone.xlsx")).unwrap_err();
    assert!(matches!(err, SheetError::Io(_)));
}
