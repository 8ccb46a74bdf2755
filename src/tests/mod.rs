mod hierarchy;
mod lifecycle;
mod randomised;
