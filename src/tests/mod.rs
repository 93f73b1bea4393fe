mod invalid_json;
mod link_create;
mod links;
mod login;
mod redirect;
