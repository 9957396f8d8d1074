#[cfg(test)]
mod archive_tests {
    use std::io::{Cursor, Read};

    use crate::archive::{archive_filename, pack};
    use crate::pdf::RenderedArtifact;

    fn artifact(name: &str, bytes: &[u8]) -> RenderedArtifact {
        RenderedArtifact {
            filename: name.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    fn read_entry(archive_bytes: &[u8], name: &str) -> Vec<u8> {
        let mut archive = zip::ZipArchive::new(Cursor::new(archive_bytes)).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        content
    }

    #[test]
    fn packs_all_files_under_their_names() {
        let files = vec![
            artifact("Registrierung_Elmstreet 5_Top 1.pdf", b"one"),
            artifact("Registrierung_Elmstreet 5_Top 2.pdf", b"two"),
        ];

        let bytes = pack(&files, |_| {}).unwrap();

        let archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(
            read_entry(&bytes, "Registrierung_Elmstreet 5_Top 1.pdf"),
            b"one"
        );
        assert_eq!(
            read_entry(&bytes, "Registrierung_Elmstreet 5_Top 2.pdf"),
            b"two"
        );
    }

    #[test]
    fn duplicate_names_overwrite_instead_of_erroring() {
        let files = vec![
            artifact("a.pdf", b"first"),
            artifact("b.pdf", b"other"),
            artifact("a.pdf", b"second"),
        ];

        let bytes = pack(&files, |_| {}).unwrap();

        let archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(read_entry(&bytes, "a.pdf"), b"second");
    }

    #[test]
    fn reports_percent_progress_up_to_completion() {
        let files = vec![
            artifact("a.pdf", b"a"),
            artifact("b.pdf", b"b"),
            artifact("c.pdf", b"c"),
            artifact("d.pdf", b"d"),
        ];

        let mut seen = Vec::new();
        pack(&files, |percent| seen.push(percent)).unwrap();

        assert_eq!(seen, vec![0, 25, 50, 75, 100]);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn empty_input_yields_empty_archive() {
        let mut seen = Vec::new();
        let bytes = pack(&[], |percent| seen.push(percent)).unwrap();

        let archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        assert_eq!(archive.len(), 0);
        assert_eq!(seen, vec![0, 100]);
    }

    #[test]
    fn archive_is_named_after_the_building() {
        assert_eq!(
            archive_filename("Elmstreet 5"),
            "Registrierungscodes_Elmstreet 5.zip"
        );
    }
}
