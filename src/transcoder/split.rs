use memchr::memmem;

/// Splits a record body on a (possibly multi-byte) separator.
///
/// Empty fields are kept: leading, trailing and consecutive separators all
/// yield empty slices, and an empty body yields a single empty field. Matches
/// are non-overlapping and found left to right.
///
/// # Example
///
/// ```
/// use csv_cleaner::transcoder::FieldSplitter;
///
/// let fields: Vec<&[u8]> = FieldSplitter::new(b"a~^~~^~c", b"~^~").collect();
/// assert_eq!(fields, vec![&b"a"[..], &b""[..], &b"c"[..]]);
/// ```
#[derive(Debug, Clone)]
pub struct FieldSplitter<'a> {
    rest: Option<&'a [u8]>,
    separator: &'a [u8],
}

impl<'a> FieldSplitter<'a> {
    pub fn new(body: &'a [u8], separator: &'a [u8]) -> Self {
        Self {
            rest: Some(body),
            separator,
        }
    }
}

impl<'a> Iterator for FieldSplitter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest?;

        match find(rest, self.separator) {
            Some(at) => {
                self.rest = Some(&rest[at + self.separator.len()..]);
                Some(&rest[..at])
            }
            None => {
                self.rest = None;
                Some(rest)
            }
        }
    }
}

/// Position of the first occurrence of `needle` in `haystack`.
///
/// An empty needle never matches, so an unvalidated empty separator leaves
/// the body as one field instead of looping forever.
pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    memmem::find(haystack, needle)
}
