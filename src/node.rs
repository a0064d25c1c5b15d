use crate::{
    pager::PAGE_SIZE,
    row::{Row, ROW_SIZE},
};

// Common Node Header Layout
pub const NODE_TYPE_SIZE: usize = std::mem::size_of::<u8>();
pub const NODE_TYPE_OFFSET: usize = 0;
pub const IS_ROOT_SIZE: usize = std::mem::size_of::<u8>();
pub const IS_ROOT_OFFSET: usize = NODE_TYPE_SIZE;
pub const PARENT_POINTER_SIZE: usize = std::mem::size_of::<u32>();
pub const PARENT_POINTER_OFFSET: usize = IS_ROOT_OFFSET + IS_ROOT_SIZE;
pub const COMMON_NODE_HEADER_SIZE: usize = NODE_TYPE_SIZE + IS_ROOT_SIZE + PARENT_POINTER_SIZE;

// Leaf Node Header Layout
pub const LEAF_NODE_NUM_CELLS_SIZE: usize = std::mem::size_of::<u32>();
pub const LEAF_NODE_NUM_CELLS_OFFSET: usize = COMMON_NODE_HEADER_SIZE;
pub const LEAF_NODE_HEADER_SIZE: usize = COMMON_NODE_HEADER_SIZE + LEAF_NODE_NUM_CELLS_SIZE;

// Leaf Node Body Layout
pub const LEAF_NODE_KEY_SIZE: usize = std::mem::size_of::<u32>();
pub const LEAF_NODE_KEY_OFFSET: usize = 0;
pub const LEAF_NODE_VALUE_SIZE: usize = ROW_SIZE;
pub const LEAF_NODE_VALUE_OFFSET: usize = LEAF_NODE_KEY_OFFSET + LEAF_NODE_KEY_SIZE;
pub const LEAF_NODE_CELL_SIZE: usize = LEAF_NODE_KEY_SIZE + LEAF_NODE_VALUE_SIZE;
pub const LEAF_NODE_SPACE_FOR_CELLS: usize = PAGE_SIZE - LEAF_NODE_HEADER_SIZE;
pub const CELLS_PER_LEAF: usize = LEAF_NODE_SPACE_FOR_CELLS / LEAF_NODE_CELL_SIZE;

// Leaf Node Format
// |-------------+----------------+----------------+-----------+
// | byte 0      | byte 1         | bytes 2-5      | bytes 6-9 |
// | node_type   | is_root        | parent_pointer | num_cells |
// |-------------+----------------+----------------+-----------+
// | bytes 10-13                  | bytes 14-304                |
// | key 0                        | value 0                     |
// |------------------------------+------------------------------|
// |             ...              |          ...                 |
// |------------------------------+------------------------------|
// |                          wasted space                        |
// |------------------------------------------------------------|
//
// `Node::Internal` is a reserved extension point. Nothing constructs
// one today; only its accessors exist.

pub enum Node {
    Leaf {
        is_root: bool,
        parent_pointer: u32,
        num_cells: u32,
        cells: Vec<LeafNodeCell>,
    },
    Internal {
        is_root: bool,
        parent_pointer: u32,
    },
}

pub struct LeafNodeCell {
    key: u32,
    value: Row,
}

impl LeafNodeCell {
    pub fn new() -> Self {
        let row = [0; ROW_SIZE];
        Self {
            key: 0,
            value: Row::deserialize(&row),
        }
    }
}

impl Default for LeafNodeCell {
    fn default() -> Self {
        Self::new()
    }
}

impl Node {
    /// Builds a fresh, empty leaf node with the leaf type tag set.
    pub fn initialize_leaf_node() -> Self {
        let mut cells = Vec::with_capacity(CELLS_PER_LEAF);
        for _ in 0..CELLS_PER_LEAF {
            cells.push(LeafNodeCell::new())
        }
        Node::Leaf {
            is_root: false,
            parent_pointer: 0,
            num_cells: 0,
            cells,
        }
    }

    pub fn leaf_node_num_cells(&mut self) -> &mut u32 {
        match self {
            Node::Leaf { num_cells, .. } => num_cells,
            Node::Internal { .. } => panic!("leaf_node_num_cells: not a leaf node"),
        }
    }

    pub fn leaf_node_cell(&mut self, cell_num: u32) -> &mut LeafNodeCell {
        match self {
            Node::Leaf { cells, .. } => &mut cells[cell_num as usize],
            Node::Internal { .. } => panic!("leaf_node_cell: not a leaf node"),
        }
    }

    pub fn leaf_node_key(&mut self, cell_num: u32) -> &mut u32 {
        &mut self.leaf_node_cell(cell_num).key
    }

    pub fn leaf_node_value(&mut self, cell_num: u32) -> &mut Row {
        &mut self.leaf_node_cell(cell_num).value
    }

    pub fn is_node_root(&self) -> bool {
        match self {
            Node::Leaf { is_root, .. } => *is_root,
            Node::Internal { is_root, .. } => *is_root,
        }
    }

    pub fn set_node_root(&mut self, is_root: bool) {
        let is_root_curr = match self {
            Node::Leaf { is_root, .. } => is_root,
            Node::Internal { is_root, .. } => is_root,
        };
        *is_root_curr = is_root;
    }

    pub fn parent(&mut self) -> &mut u32 {
        match self {
            Node::Leaf { parent_pointer, .. } => parent_pointer,
            Node::Internal { parent_pointer, .. } => parent_pointer,
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let node_type = bytes[NODE_TYPE_OFFSET];
        let is_root = bytes[IS_ROOT_OFFSET] == 1;

        let start = PARENT_POINTER_OFFSET;
        let end = start + PARENT_POINTER_SIZE;
        let mut parent_pointer_bytes = [0; PARENT_POINTER_SIZE];
        parent_pointer_bytes.copy_from_slice(&bytes[start..end]);
        let parent_pointer = u32::from_le_bytes(parent_pointer_bytes);

        if node_type != 1 {
            let start = LEAF_NODE_NUM_CELLS_OFFSET;
            let end = start + LEAF_NODE_NUM_CELLS_SIZE;
            let mut num_cells_bytes = [0; LEAF_NODE_NUM_CELLS_SIZE];
            num_cells_bytes.copy_from_slice(&bytes[start..end]);
            let num_cells = u32::from_le_bytes(num_cells_bytes);

            let mut cells = Vec::with_capacity(CELLS_PER_LEAF);
            let mut start = LEAF_NODE_HEADER_SIZE;

            for _ in 0..CELLS_PER_LEAF {
                let end = start + LEAF_NODE_KEY_SIZE;
                let mut key_bytes = [0; LEAF_NODE_KEY_SIZE];
                key_bytes.copy_from_slice(&bytes[start..end]);
                let key = u32::from_le_bytes(key_bytes);

                let start_value = end;
                let end_value = start_value + ROW_SIZE;
                let value = Row::deserialize(&bytes[start_value..end_value]);

                cells.push(LeafNodeCell { key, value });
                start = end_value;
            }

            Node::Leaf {
                is_root,
                parent_pointer,
                num_cells,
                cells,
            }
        } else {
            Node::Internal {
                is_root,
                parent_pointer,
            }
        }
    }

    pub fn to_bytes(&self) -> [u8; PAGE_SIZE] {
        let mut page = [0; PAGE_SIZE];

        match self {
            Node::Leaf {
                is_root,
                parent_pointer,
                num_cells,
                cells,
            } => {
                page[NODE_TYPE_OFFSET] = 0;
                page[IS_ROOT_OFFSET] = if *is_root { 1 } else { 0 };

                let start = PARENT_POINTER_OFFSET;
                let end = start + PARENT_POINTER_SIZE;
                page[start..end].copy_from_slice(&parent_pointer.to_le_bytes());

                let start = LEAF_NODE_NUM_CELLS_OFFSET;
                let end = start + LEAF_NODE_NUM_CELLS_SIZE;
                page[start..end].copy_from_slice(&num_cells.to_le_bytes());

                let mut start = LEAF_NODE_HEADER_SIZE;
                for cell in cells {
                    let end = start + LEAF_NODE_KEY_SIZE;
                    page[start..end].copy_from_slice(&cell.key.to_le_bytes());

                    let start_value = end;
                    let end_value = start_value + ROW_SIZE;
                    cell.value.serialize(&mut page[start_value..end_value]);

                    start = end_value;
                }
            }
            Node::Internal {
                is_root,
                parent_pointer,
            } => {
                page[NODE_TYPE_OFFSET] = 1;
                page[IS_ROOT_OFFSET] = if *is_root { 1 } else { 0 };

                let start = PARENT_POINTER_OFFSET;
                let end = start + PARENT_POINTER_SIZE;
                page[start..end].copy_from_slice(&parent_pointer.to_le_bytes());
            }
        }

        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_per_leaf_matches_layout_math() {
        assert_eq!(CELLS_PER_LEAF, 13);
    }

    #[test]
    fn fresh_leaf_has_zero_cells_and_leaf_type_tag() {
        let node = Node::initialize_leaf_node();
        let bytes = node.to_bytes();
        assert_eq!(bytes[NODE_TYPE_OFFSET], 0);

        let mut round_tripped = Node::from_bytes(&bytes);
        assert_eq!(*round_tripped.leaf_node_num_cells(), 0);
    }

    #[test]
    fn leaf_node_round_trips_through_bytes() {
        let mut node = Node::initialize_leaf_node();
        *node.leaf_node_num_cells() = 1;
        *node.leaf_node_key(0) = 7;
        *node.leaf_node_value(0) = Row::new(7, "alice", "alice@x").unwrap();

        let bytes = node.to_bytes();
        let mut restored = Node::from_bytes(&bytes);

        assert_eq!(*restored.leaf_node_num_cells(), 1);
        assert_eq!(*restored.leaf_node_key(0), 7);
        assert_eq!(restored.leaf_node_value(0).id, 7);
    }

    #[test]
    #[should_panic(expected = "not a leaf node")]
    fn internal_node_accessors_panic_since_never_constructed_as_leaf() {
        let mut node = Node::Internal {
            is_root: false,
            parent_pointer: 0,
        };
        node.leaf_node_num_cells();
    }
}
