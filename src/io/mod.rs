pub mod desk_io;
pub mod export;
pub mod recovery;
pub mod slots;
pub mod storage;
