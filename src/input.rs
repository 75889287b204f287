use bzip2::read::BzDecoder;
use flate2::read::MultiGzDecoder;
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use xz2::read::XzDecoder;

use crate::error::InputError;

/// Read a variant file, decompressing `.gz`, `.bz2` and `.xz` by extension
pub fn read_input_file(path: &Path) -> Result<String, InputError> {
    let file = File::open(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => InputError::NotFound(path.to_path_buf()),
        _ => InputError::Read(err),
    })?;

    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let reader: Box<dyn Read> = match extension.as_str() {
        "gz" | "bgz" => Box::new(MultiGzDecoder::new(BufReader::new(file))),
        "bz2" => Box::new(BzDecoder::new(BufReader::new(file))),
        "xz" => Box::new(XzDecoder::new(BufReader::new(file))),
        _ => Box::new(BufReader::new(file)),
    };

    read_text(reader)
}

/// Read stdin-style input. A JSON object carries the text in `file_content`;
/// anything else is taken verbatim.
pub fn read_payload<R: Read>(reader: R) -> Result<String, InputError> {
    read_text(reader).map(unwrap_payload)
}

pub fn unwrap_payload(text: String) -> String {
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(payload)) => payload
            .get("file_content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => text,
    }
}

fn read_text<R: Read>(mut reader: R) -> Result<String, InputError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(InputError::Read)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const VCF_LINE: &str = "17\t41197694\t.\tA\tT\t50\tPASS\tDP=80\n";

    #[test]
    fn test_plain_and_gzip_files() {
        let dir = tempfile::tempdir().expect("temp dir");

        let plain = dir.path().join("sample.vcf");
        std::fs::write(&plain, VCF_LINE).expect("write plain");
        assert_eq!(read_input_file(&plain).expect("readable"), VCF_LINE);

        let gzipped = dir.path().join("sample.vcf.gz");
        let mut encoder = GzEncoder::new(File::create(&gzipped).expect("create"), Compression::default());
        encoder.write_all(VCF_LINE.as_bytes()).expect("compress");
        encoder.finish().expect("finish");
        assert_eq!(read_input_file(&gzipped).expect("readable"), VCF_LINE);
    }

    #[test]
    fn test_missing_file_message() {
        let err = read_input_file(Path::new("/no/such/variants.vcf")).unwrap_err();
        assert_eq!(err.to_string(), "File not found: /no/such/variants.vcf");
    }

    #[test]
    fn test_payload_unwrapping() {
        assert_eq!(
            read_payload(r#"{"file_content": "ATCG"}"#.as_bytes()).expect("readable"),
            "ATCG"
        );
        assert_eq!(read_payload(r#"{"other": 1}"#.as_bytes()).expect("readable"), "");
        assert_eq!(read_payload("ATCGATCG\n".as_bytes()).expect("readable"), "ATCGATCG\n");
        assert_eq!(read_payload(r#""quoted""#.as_bytes()).expect("readable"), r#""quoted""#);
    }
}
