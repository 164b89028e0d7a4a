mod common;

mod chats_and_invites;
mod media_fanout;
mod presence;
mod rooms;
mod store_integrity;
