mod album;
mod ids;
mod playlist;
mod song;
mod user;

pub use album::{Album, AlbumDetail, CreateAlbum, LikeCount, UpdateAlbum};
pub use ids::{AlbumId, PlaylistId, SongId, UserId};
pub use playlist::{
    ActivityAction, Playlist, PlaylistActivities, PlaylistActivity, PlaylistSummary,
    PlaylistWithSongs,
};
pub use song::{CreateSong, Song, SongFilter, SongSummary, UpdateSong};
pub use user::{CreateUser, User};
