use std::cell::RefCell;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, Write};

use log::{debug, warn};
use thiserror::Error;

use crate::node::Node;

pub const PAGE_SIZE: usize = 4096;
pub const TABLE_MAX_PAGES: usize = 100;

/// Fatal conditions the pager can run into.
#[derive(Debug, Error)]
pub enum PagerError {
    #[error("unable to open database file: {0}")]
    Open(#[source] std::io::Error),
    #[error("unable to read file metadata: {0}")]
    Metadata(#[source] std::io::Error),
    #[error("database file has incomplete page (size is not a multiple of {PAGE_SIZE})")]
    IncompletePage,
    #[error("tried to fetch page number out of bounds: {requested} >= {max}")]
    PageNumberOutOfBounds { requested: u32, max: usize },
    #[error("unable to seek within database file: {0}")]
    Seek(#[source] std::io::Error),
    #[error("unable to read page from database file: {0}")]
    Read(#[source] std::io::Error),
    #[error("unable to write page to database file: {0}")]
    Write(#[source] std::io::Error),
    #[error("unable to close database file: {0}")]
    Close(#[source] std::io::Error),
}

pub struct Pager {
    file: File,
    file_length: u64,
    pub num_pages: u32,
    pages: Vec<Option<Node>>,
}

impl Pager {
    pub fn pager_open(filename: &str) -> Result<Self, PagerError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(filename)
            .map_err(PagerError::Open)?;

        let metadata = file.metadata().map_err(PagerError::Metadata)?;
        let file_length = metadata.len();

        if file_length % PAGE_SIZE as u64 != 0 {
            return Err(PagerError::IncompletePage);
        }

        let num_pages = (file_length / PAGE_SIZE as u64) as u32;
        let mut pages = Vec::with_capacity(TABLE_MAX_PAGES);
        pages.resize_with(TABLE_MAX_PAGES, || None);

        debug!("opened {filename} with {num_pages} persisted page(s)");

        Ok(Self {
            file,
            file_length,
            num_pages,
            pages,
        })
    }

    pub fn file_length(&self) -> u64 {
        self.file_length
    }

    fn validate_page_num(page_num: u32) -> Result<(), PagerError> {
        if page_num as usize >= TABLE_MAX_PAGES {
            return Err(PagerError::PageNumberOutOfBounds {
                requested: page_num,
                max: TABLE_MAX_PAGES,
            });
        }
        Ok(())
    }

    pub fn get_page(&mut self, page_num: u32) -> Result<&mut Node, PagerError> {
        Self::validate_page_num(page_num)?;

        if self.pages[page_num as usize].is_none() {
            debug!("cache miss on page {page_num}, loading");

            let mut node = Node::initialize_leaf_node();

            if page_num <= self.num_pages {
                let offset = page_num as u64 * PAGE_SIZE as u64;
                self.file
                    .seek(std::io::SeekFrom::Start(offset))
                    .map_err(PagerError::Seek)?;

                let mut buffer = [0; PAGE_SIZE];
                self.file.read(&mut buffer).map_err(PagerError::Read)?;

                node = Node::from_bytes(&buffer);
            }

            if page_num >= self.num_pages {
                self.num_pages = page_num + 1;
            }

            self.pages[page_num as usize] = Some(node);
        }

        Ok(self.pages[page_num as usize].as_mut().unwrap())
    }

    pub fn pager_flush(&mut self, page_num: u32) -> Result<(), PagerError> {
        Self::validate_page_num(page_num)?;

        let Some(page) = self.pages[page_num as usize].as_ref() else {
            warn!("attempting to write empty page {page_num}");
            return Ok(());
        };

        let offset = page_num as u64 * PAGE_SIZE as u64;
        self.file
            .seek(std::io::SeekFrom::Start(offset))
            .map_err(PagerError::Seek)?;

        self.file.write(&page.to_bytes()).map_err(|err| {
            log::error!("failed to write page {page_num}: {err}");
            PagerError::Write(err)
        })?;
        Ok(())
    }

    pub fn pager_close(&mut self) -> Result<(), PagerError> {
        for i in 0..self.num_pages {
            self.pager_flush(i)?;
        }
        self.pages.iter_mut().for_each(|slot| *slot = None);
        Ok(())
    }
}

pub struct PagerProxy<'a>(RefCell<&'a mut Pager>);

impl<'a> PagerProxy<'a> {
    pub fn new(pager: &'a mut Pager) -> Self {
        Self(RefCell::new(pager))
    }
}

/// Renders the `.btree` diagnostic dump: `leaf (size N)` followed by one
/// `  - i : key` line per cell.
impl<'a> fmt::Display for PagerProxy<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut pager = self.0.borrow_mut();
        let node = pager
            .get_page(0)
            .expect("root page must exist after a successful open");

        match node {
            Node::Leaf { num_cells, .. } => {
                let num_cells = *num_cells;
                writeln!(f, "leaf (size {num_cells})")?;
                for i in 0..num_cells {
                    let key = *node.leaf_node_key(i);
                    writeln!(f, "  - {i} : {key}")?;
                }
                Ok(())
            }
            Node::Internal { .. } => writeln!(f, "internal (not yet supported)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn fresh_file_has_a_single_root_page() {
        let file = NamedTempFile::new().unwrap();
        let pager = Pager::pager_open(file.path().to_str().unwrap()).unwrap();
        assert_eq!(pager.num_pages, 0);
        assert_eq!(pager.file_length(), 0);
    }

    #[test]
    fn get_page_extends_num_pages_for_a_fresh_page() {
        let file = NamedTempFile::new().unwrap();
        let mut pager = Pager::pager_open(file.path().to_str().unwrap()).unwrap();
        pager.get_page(0).unwrap();
        assert_eq!(pager.num_pages, 1);
    }

    #[test]
    fn flushing_an_empty_slot_is_a_benign_no_op() {
        let file = NamedTempFile::new().unwrap();
        let mut pager = Pager::pager_open(file.path().to_str().unwrap()).unwrap();
        pager.num_pages = 1;
        assert!(pager.pager_flush(0).is_ok());
    }

    #[test]
    fn page_number_out_of_bounds_is_rejected() {
        let file = NamedTempFile::new().unwrap();
        let mut pager = Pager::pager_open(file.path().to_str().unwrap()).unwrap();
        let err = pager.get_page(TABLE_MAX_PAGES as u32).unwrap_err();
        assert!(matches!(err, PagerError::PageNumberOutOfBounds { .. }));
    }

    #[test]
    fn opening_a_file_with_incomplete_page_size_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0u8; PAGE_SIZE / 2]).unwrap();
        let err = Pager::pager_open(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, PagerError::IncompletePage));
    }

    #[test]
    fn writes_and_reads_survive_a_round_trip_through_disk() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap().to_string();

        {
            let mut pager = Pager::pager_open(&path).unwrap();
            let node = pager.get_page(0).unwrap();
            *node.leaf_node_num_cells() = 2;
            pager.pager_close().unwrap();
        }

        let mut pager = Pager::pager_open(&path).unwrap();
        assert_eq!(pager.num_pages, 1);
        let node = pager.get_page(0).unwrap();
        assert_eq!(*node.leaf_node_num_cells(), 2);
    }
}
