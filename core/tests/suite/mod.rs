mod local_source;
