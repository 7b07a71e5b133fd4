mod helpers;
mod middleware;
mod pagination;
