mod tracker_contract;
mod union_tracker;
