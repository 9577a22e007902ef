mod pipeline;
mod rollback;
