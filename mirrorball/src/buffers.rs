mod bind_group;
mod bindable;
mod cubemap;
mod mapped_storage_buffer;
mod storage_texture;
mod unmapped_storage_buffer;

pub use self::bind_group::*;
pub use self::bindable::*;
pub use self::cubemap::*;
pub use self::mapped_storage_buffer::*;
pub use self::storage_texture::*;
pub use self::unmapped_storage_buffer::*;
