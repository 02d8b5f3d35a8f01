//! Minimal jar reader: lists entry names from the zip central directory.
//! Entry contents are never inflated.

use std::fs::File;
use std::io::{
    Cursor,
    Read,
    Seek,
    SeekFrom,
};
use std::path::{
    Path,
    PathBuf,
};

use byteorder::{
    LittleEndian,
    ReadBytesExt,
};

use crate::error::FrontendError;

const END_OF_CENTRAL_DIRECTORY: u32 = 0x0605_4b50;
const CENTRAL_DIRECTORY_HEADER: u32 = 0x0201_4b50;
const END_RECORD_LEN: u64 = 22;
const MAX_COMMENT_LEN: u64 = u16::MAX as u64;
const CENTRAL_HEADER_LEN: usize = 46;
/// Field values that defer to a ZIP64 end record.
const ZIP64_COUNT: u16 = u16::MAX;
const ZIP64_FIELD: u32 = u32::MAX;

/// An open archive on a classpath. The handle stays open until dropped.
#[derive(Debug)]
pub struct Archive {
    path: PathBuf,
    file: File,
}

impl Archive {
    pub fn open(path: &Path) -> Result<Self, FrontendError> {
        let file = File::open(path).map_err(|err| FrontendError::io(path, err))?;

        Ok(Archive {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of every entry, in central directory order.
    pub fn entry_names(&mut self) -> Result<Vec<String>, FrontendError> {
        let (offset, size, count) = self.find_central_directory()?;

        let mut directory = vec![0u8; size as usize];
        self.file
            .seek(SeekFrom::Start(offset))
            .and_then(|_| self.file.read_exact(&mut directory))
            .map_err(|err| FrontendError::io(&self.path, err))?;

        let mut cursor = Cursor::new(directory.as_slice());
        let mut names = Vec::with_capacity(count as usize);

        for _ in 0..count {
            names.push(self.read_entry_name(&mut cursor)?);
        }

        Ok(names)
    }

    fn find_central_directory(&mut self) -> Result<(u64, u32, u16), FrontendError> {
        let len = self
            .file
            .metadata()
            .map_err(|err| FrontendError::io(&self.path, err))?
            .len();
        if len < END_RECORD_LEN {
            return Err(self.malformed("file too short"));
        }

        let tail_len = len.min(END_RECORD_LEN + MAX_COMMENT_LEN);
        let mut tail = vec![0u8; tail_len as usize];
        self.file
            .seek(SeekFrom::Start(len - tail_len))
            .and_then(|_| self.file.read_exact(&mut tail))
            .map_err(|err| FrontendError::io(&self.path, err))?;

        let signature = END_OF_CENTRAL_DIRECTORY.to_le_bytes();
        let record_start = (0..=tail.len() - END_RECORD_LEN as usize)
            .rev()
            .find(|&i| tail[i..i + 4] == signature)
            .ok_or_else(|| self.malformed("missing end of central directory"))?;

        let mut record = Cursor::new(&tail[record_start + 4..]);
        let read = |record: &mut Cursor<&[u8]>| -> std::io::Result<(u64, u32, u16)> {
            record.seek(SeekFrom::Current(6))?;
            let count = record.read_u16::<LittleEndian>()?;
            let size = record.read_u32::<LittleEndian>()?;
            let offset = record.read_u32::<LittleEndian>()?;
            Ok((offset as u64, size, count))
        };
        let (offset, size, count) =
            read(&mut record).map_err(|err| FrontendError::io(&self.path, err))?;

        if count == ZIP64_COUNT || size == ZIP64_FIELD || offset == ZIP64_FIELD as u64 {
            return Err(self.malformed("zip64 unsupported"));
        }
        if offset + size as u64 > len {
            return Err(self.malformed("central directory out of bounds"));
        }

        Ok((offset, size, count))
    }

    fn read_entry_name(&self, cursor: &mut Cursor<&[u8]>) -> Result<String, FrontendError> {
        let start = cursor.position() as usize;
        let data = *cursor.get_ref();
        if data.len() < start + CENTRAL_HEADER_LEN {
            return Err(self.malformed("truncated central directory"));
        }

        let mut header = Cursor::new(&data[start..start + CENTRAL_HEADER_LEN]);
        let read_header = |header: &mut Cursor<&[u8]>| -> std::io::Result<(u32, usize, usize, usize)> {
            let signature = header.read_u32::<LittleEndian>()?;
            header.set_position(28);
            let name_len = header.read_u16::<LittleEndian>()? as usize;
            let extra_len = header.read_u16::<LittleEndian>()? as usize;
            let comment_len = header.read_u16::<LittleEndian>()? as usize;
            Ok((signature, name_len, extra_len, comment_len))
        };
        let (signature, name_len, extra_len, comment_len) =
            read_header(&mut header).map_err(|err| FrontendError::io(&self.path, err))?;

        if signature != CENTRAL_DIRECTORY_HEADER {
            return Err(self.malformed("bad central directory signature"));
        }

        let name_start = start + CENTRAL_HEADER_LEN;
        let next = name_start + name_len + extra_len + comment_len;
        if data.len() < next {
            return Err(self.malformed("truncated entry name"));
        }

        cursor.set_position(next as u64);

        Ok(String::from_utf8_lossy(&data[name_start..name_start + name_len]).into_owned())
    }

    fn malformed(&self, reason: &str) -> FrontendError {
        FrontendError::Archive {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

/// Builds a stored (uncompressed, empty-bodied) zip with the given entry
/// names. Only the bits `Archive` reads are filled in.
#[cfg(test)]
pub(crate) fn write_test_archive(path: &Path, names: &[&str]) {
    use byteorder::WriteBytesExt;

    let mut local = Vec::new();
    let mut central = Vec::new();

    for name in names {
        let offset = local.len() as u32;

        local.write_u32::<LittleEndian>(0x0403_4b50).unwrap();
        local.extend_from_slice(&[0u8; 22]);
        local.write_u16::<LittleEndian>(name.len() as u16).unwrap();
        local.write_u16::<LittleEndian>(0).unwrap();
        local.extend_from_slice(name.as_bytes());

        central.write_u32::<LittleEndian>(CENTRAL_DIRECTORY_HEADER).unwrap();
        central.extend_from_slice(&[0u8; 24]);
        central.write_u16::<LittleEndian>(name.len() as u16).unwrap();
        central.write_u16::<LittleEndian>(0).unwrap();
        central.write_u16::<LittleEndian>(0).unwrap();
        central.extend_from_slice(&[0u8; 8]);
        central.write_u32::<LittleEndian>(offset).unwrap();
        central.extend_from_slice(name.as_bytes());
    }

    let mut out = local;
    let central_offset = out.len() as u32;
    out.extend_from_slice(&central);
    out.write_u32::<LittleEndian>(END_OF_CENTRAL_DIRECTORY).unwrap();
    out.extend_from_slice(&[0u8; 4]);
    out.write_u16::<LittleEndian>(names.len() as u16).unwrap();
    out.write_u16::<LittleEndian>(names.len() as u16).unwrap();
    out.write_u32::<LittleEndian>(central.len() as u32).unwrap();
    out.write_u32::<LittleEndian>(central_offset).unwrap();
    out.write_u16::<LittleEndian>(0).unwrap();

    std::fs::write(path, out).unwrap();
}
